// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use async_trait::async_trait;
use error::Error;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Source of raw response bodies for weather queries.
///
/// Bodies come back whole. A current-weather document is a few hundred
/// bytes, and the decoder reads it through `&[u8]` like any other reader.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(timeout: Duration) -> Result<Self, Error> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  #[instrument(skip(self, url), fields(host = url.host_str().unwrap_or_default()))]
  async fn fetch(&self, url: &Url) -> Result<Vec<u8>, Error> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(classify)?;

    let status = response.status();
    match status {
      s if s.is_success() => (),
      reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimitExceeded),
      _ => {
        let body = response
          .text()
          .await
          .unwrap_or_else(|_| "Unknown error".to_string());
        error!("API request failed with status: {}", status);
        return Err(Error::HttpStatus {
          status: status.as_u16(),
          body,
        });
      }
    }

    // buffered so a timeout mid-body surfaces as `Timeout`, not a parse error
    let body = response.bytes().await.map_err(classify)?;
    debug!(bytes = body.len(), "received weather response");
    Ok(body.to_vec())
  }
}

fn classify(err: reqwest::Error) -> Error {
  if err.is_timeout() {
    Error::Timeout
  } else {
    Error::Transport(err)
  }
}
