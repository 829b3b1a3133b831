// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub(crate) const DEFAULT_CACHE_KIND: &str = "weather";
pub(crate) const DEFAULT_CACHE_TTL_SECS: u64 = 10;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub weather: WeatherSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
  pub api_base_url: String,
  pub cache_kind: String,
  /// Kept short so stale readings are easy to observe; production setups want minutes.
  pub cache_ttl_secs: u64,
  pub request_timeout_secs: u64,
  pub purge_interval_secs: Option<u64>,
  pub units: Option<String>,
}

impl Default for WeatherSettings {
  fn default() -> Self {
    Self {
      api_base_url: DEFAULT_API_BASE_URL.to_string(),
      cache_kind: DEFAULT_CACHE_KIND.to_string(),
      cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
      request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
      purge_interval_secs: None,
      units: None,
    }
  }
}

impl WeatherSettings {
  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache_ttl_secs)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn purge_interval(&self) -> Option<Duration> {
    self
      .purge_interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }
}

impl Config {
  #[instrument(skip(path))]
  pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_toml(&content)
  }

  pub fn from_toml(content: &str) -> anyhow::Result<Self> {
    let config: Self = toml::from_str(content)?;
    tracing::debug!("Loaded configuration successfully");
    Ok(config)
  }
}
