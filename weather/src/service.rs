// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  config::WeatherConfig,
  models::weather::WeatherRecord,
  parser::parse_stream,
  transport::{HttpTransport, Transport},
};
use cache::{CacheHandle, CacheRegistry};
use error::Error;
use tracing::{debug, info, instrument, warn};

pub type WeatherCacheRegistry = CacheRegistry<String, Vec<WeatherRecord>>;

/// Current-weather lookups fronted by a shared, short-lived cache.
///
/// The service holds one acquisition of the cache registered under the
/// configured kind; dropping the service releases it. Two lookups that miss
/// on the same location at the same time both fetch, and the later write
/// wins.
pub struct WeatherService {
  config: WeatherConfig,
  transport: Box<dyn Transport>,
  cache: CacheHandle<String, Vec<WeatherRecord>>,
}

impl WeatherService {
  pub fn new(config: WeatherConfig, registry: &WeatherCacheRegistry) -> Result<Self, Error> {
    let transport = HttpTransport::new(config.request_timeout)?;
    Ok(Self::with_transport(config, registry, Box::new(transport)))
  }

  pub fn with_transport(
    config: WeatherConfig,
    registry: &WeatherCacheRegistry,
    transport: Box<dyn Transport>,
  ) -> Self {
    let cache = registry.acquire(config.cache_kind());
    debug!(kind = config.cache_kind(), "weather cache acquired");
    Self {
      config,
      transport,
      cache,
    }
  }

  #[instrument(skip(self))]
  pub async fn lookup(&self, location: &str) -> Result<Vec<WeatherRecord>, Error> {
    if location.trim().is_empty() {
      return Err(Error::InvalidLocation("Location cannot be empty".into()));
    }

    if let Some(records) = self.cache.get(location) {
      info!("Returning cached weather data for {}", location);
      return Ok(records);
    }

    info!("Fetching weather data for {}", location);
    let records = self.fetch(location).await?;
    self
      .cache
      .put(location.to_string(), records.clone(), self.config.cache_ttl);

    Ok(records)
  }

  async fn fetch(&self, location: &str) -> Result<Vec<WeatherRecord>, Error> {
    let url = self.config.location_url(location);
    let body = self.transport.fetch(&url).await?;
    let records = parse_stream(body.as_slice())?;

    let Some(first) = records.first() else {
      warn!("No weather data returned for \"{}\"", location);
      return Err(Error::NoResults(location.to_string()));
    };
    if let Some(message) = first.api_error() {
      warn!("{} \"{}\"", message, location);
      return Err(Error::Api(message.to_string()));
    }

    Ok(records)
  }
}
