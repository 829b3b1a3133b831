// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use anyhow::{bail, Context, Result};
use clap::Parser;
use config::Config;
use std::{env, path::PathBuf};
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;
use weather::{WeatherCacheRegistry, WeatherConfig, WeatherService};

const DEFAULT_CONFIG_PATH: &str = "weathercache.toml";

/// Look up current weather, serving repeats from a short-lived cache
#[derive(Parser, Debug)]
#[command(name = "weathercache")]
struct Cli {
  /// TOML configuration file; `weathercache.toml` is used when present.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Locations to look up, e.g. "Nashville" or "London,GB".
  #[arg(required = true)]
  locations: Vec<String>,
}

pub struct ServiceRunner {
  weather_service: WeatherService,
  locations: Vec<String>,
}

#[cfg(debug_assertions)]
fn setup_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .init();
}

#[cfg(not(debug_assertions))]
fn setup_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
  match path {
    Some(path) => Config::from_file(&path)
      .with_context(|| format!("Failed to load config from {}", path.display())),
    None if PathBuf::from(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH)
      .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH)),
    None => Ok(Config::default()),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  #[cfg(debug_assertions)]
  dotenvy::dotenv().ok();
  setup_logging();

  let cli = Cli::parse();
  let config = load_config(cli.config)?;
  let api_key = env::var("OPENWEATHER_API_KEY").context("Missing OPENWEATHER_API_KEY")?;

  let mut registry = WeatherCacheRegistry::new();
  if let Some(every) = config.weather.purge_interval() {
    registry = registry.with_purge_interval(every);
  }

  let runner = ServiceRunner::new(
    WeatherConfig::new(api_key, &config.weather)?,
    &registry,
    cli.locations,
  )?;

  let failed = runner.run().await?;
  if failed > 0 {
    bail!("{} lookup(s) failed", failed);
  }

  Ok(())
}

impl ServiceRunner {
  #[instrument(skip(config, registry))]
  pub fn new(
    config: WeatherConfig,
    registry: &WeatherCacheRegistry,
    locations: Vec<String>,
  ) -> Result<Self> {
    Ok(Self {
      weather_service: WeatherService::new(config, registry)?,
      locations,
    })
  }

  /// Returns how many lookups failed. The service and its cache
  /// acquisition are released when the run ends.
  #[instrument(skip(self))]
  pub async fn run(self) -> Result<usize> {
    let mut failed = 0;
    for location in &self.locations {
      match self.weather_service.lookup(location).await {
        Ok(records) => {
          info!("Got {} record(s) for {}", records.len(), location);
          println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Err(e) => {
          error!("Failed to look up weather for {}: {}", location, e);
          failed += 1;
        }
      }
    }
    Ok(failed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn runner(registry: &WeatherCacheRegistry, locations: &[&str]) -> ServiceRunner {
    let config = WeatherConfig::new("test-key", &Config::default().weather).unwrap();
    let locations = locations.iter().map(|location| location.to_string()).collect();
    ServiceRunner::new(config, registry, locations).unwrap()
  }

  #[tokio::test]
  async fn test_run_counts_failures_and_releases_cache() {
    let registry = WeatherCacheRegistry::new();
    let runner = runner(&registry, &["", "   "]);
    assert_eq!(registry.ref_count("weather"), 1);

    assert_eq!(runner.run().await.unwrap(), 2);
    assert!(!registry.is_live("weather"));
  }

  #[test]
  fn test_locations_are_required() {
    assert!(Cli::try_parse_from(["weathercache"]).is_err());

    let cli = Cli::try_parse_from(["weathercache", "--config", "w.toml", "Nashville"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("w.toml")));
    assert_eq!(cli.locations, vec!["Nashville".to_string()]);
  }
}
