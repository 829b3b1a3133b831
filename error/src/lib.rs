// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
  #[error("Malformed weather document: {0}")]
  MalformedInput(#[from] serde_json::Error),
  #[error("HTTP error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("API request failed with status {status}: {body}")]
  HttpStatus { status: u16, body: String },
  #[error("Timeout error")]
  Timeout,
  #[error("Rate limit exceeded")]
  RateLimitExceeded,
  #[error("API error: {0}")]
  Api(String),
  #[error("No weather data returned for {0}")]
  NoResults(String),
  #[error("Invalid location: {0}")]
  InvalidLocation(String),
  #[error("Invalid API key")]
  InvalidApiKey,
  #[error("Invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),
}

impl Error {
  /// True when the failure happened before a response body could be parsed.
  pub fn is_transport(&self) -> bool {
    matches!(
      self,
      Error::Transport(_) | Error::HttpStatus { .. } | Error::Timeout | Error::RateLimitExceeded
    )
  }
}
