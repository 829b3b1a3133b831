// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use ::config::WeatherSettings;
use error::Error;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct WeatherConfig {
  pub(crate) api_key: String,
  pub(crate) api_base_url: Url,
  pub(crate) cache_kind: String,
  pub(crate) cache_ttl: Duration,
  pub(crate) request_timeout: Duration,
  pub(crate) units: Option<String>,
}

impl WeatherConfig {
  pub fn new(api_key: impl Into<String>, settings: &WeatherSettings) -> Result<Self, Error> {
    let api_key = api_key.into();
    if api_key.trim().is_empty() {
      return Err(Error::InvalidApiKey);
    }

    Ok(Self {
      api_key,
      api_base_url: Url::parse(&settings.api_base_url)?,
      cache_kind: settings.cache_kind.clone(),
      cache_ttl: settings.cache_ttl(),
      request_timeout: settings.request_timeout(),
      units: settings.units.clone().filter(|units| !units.trim().is_empty()),
    })
  }

  pub fn cache_kind(&self) -> &str {
    &self.cache_kind
  }

  pub fn cache_ttl(&self) -> Duration {
    self.cache_ttl
  }

  /// Query URL for `location`; every parameter is percent-encoded.
  pub(crate) fn location_url(&self, location: &str) -> Url {
    let mut url = self.api_base_url.clone();
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("q", location).append_pair("appid", &self.api_key);
      if let Some(units) = &self.units {
        query.append_pair("units", units);
      }
    }
    url
  }
}
