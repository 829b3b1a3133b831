// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! Lookups through the reqwest transport against a mock OpenWeather server.

use config::WeatherSettings;
use error::Error;
use std::time::Duration;
use weather::{HttpTransport, Transport, WeatherCacheRegistry, WeatherConfig, WeatherService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/data/2.5/weather";

fn nashville_json() -> serde_json::Value {
  serde_json::json!({
    "coord": { "lon": -86.78, "lat": 36.17 },
    "sys": { "message": 0.0138, "country": "US", "sunrise": 1431427373, "sunset": 1431477841 },
    "weather": [ { "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" } ],
    "base": "stations",
    "main": { "temp": 289.847, "temp_min": 289.847, "temp_max": 289.847,
              "pressure": 1010.71, "sea_level": 1035.76, "grnd_level": 1010.71, "humidity": 76 },
    "wind": { "speed": 2.42, "deg": 310.002 },
    "clouds": { "all": 36 },
    "dt": 1431435983, "id": 4644585, "name": "Nashville", "cod": 200
  })
}

fn settings(server: &MockServer) -> WeatherSettings {
  WeatherSettings {
    api_base_url: format!("{}{}", server.uri(), API_PATH),
    request_timeout_secs: 1,
    ..Default::default()
  }
}

fn service(server: &MockServer, registry: &WeatherCacheRegistry) -> WeatherService {
  let config = WeatherConfig::new("test-key", &settings(server)).unwrap();
  WeatherService::new(config, registry).unwrap()
}

#[tokio::test]
async fn test_lookup_fetches_once_then_serves_from_cache() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .and(query_param("q", "Nashville"))
    .and(query_param("appid", "test-key"))
    .respond_with(ResponseTemplate::new(200).set_body_json(nashville_json()))
    .expect(1)
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let service = service(&server, &registry);

  let first = service.lookup("Nashville").await.unwrap();
  let second = service.lookup("Nashville").await.unwrap();

  assert_eq!(first, second);
  assert_eq!(first.len(), 1);
  assert_eq!(first[0].name.as_deref(), Some("Nashville"));
  assert_eq!(first[0].main.unwrap().humidity, 76);
  assert_eq!(first[0].weather_conditions[0].description, "scattered clouds");
}

#[tokio::test]
async fn test_location_with_spaces_is_escaped() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .and(query_param("q", "New York, US"))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "name": "New York", "cod": 200, "weather": []
    })))
    .expect(1)
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let records = service(&server, &registry)
    .lookup("New York, US")
    .await
    .unwrap();

  assert_eq!(records[0].name.as_deref(), Some("New York"));
}

#[tokio::test]
async fn test_configured_units_are_sent() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .and(query_param("units", "metric"))
    .respond_with(ResponseTemplate::new(200).set_body_json(nashville_json()))
    .expect(1)
    .mount(&server)
    .await;

  let settings = WeatherSettings {
    units: Some("metric".into()),
    ..settings(&server)
  };
  let config = WeatherConfig::new("test-key", &settings).unwrap();
  let registry = WeatherCacheRegistry::new();
  let service = WeatherService::new(config, &registry).unwrap();

  service.lookup("Nashville").await.unwrap();
}

#[tokio::test]
async fn test_not_found_status_is_a_transport_failure() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .respond_with(
      ResponseTemplate::new(404)
        .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .expect(2)
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let service = service(&server, &registry);

  let err = service.lookup("Atlantis").await.unwrap_err();
  match &err {
    Error::HttpStatus { status, body } => {
      assert_eq!(*status, 404);
      assert!(body.contains("city not found"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
  assert!(err.is_transport());

  // nothing cached, so the second call reaches the server again
  service.lookup("Atlantis").await.unwrap_err();
}

#[tokio::test]
async fn test_error_document_with_ok_status_is_an_api_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let err = service(&server, &registry)
    .lookup("Atlantis")
    .await
    .unwrap_err();

  assert!(matches!(err, Error::Api(message) if message == "city not found"));
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .respond_with(ResponseTemplate::new(429))
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let err = service(&server, &registry)
    .lookup("Nashville")
    .await
    .unwrap_err();

  assert!(matches!(err, Error::RateLimitExceeded));
}

#[tokio::test]
async fn test_slow_server_times_out() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(nashville_json())
        .set_delay(Duration::from_secs(3)),
    )
    .mount(&server)
    .await;

  let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
  let url = url::Url::parse(&format!("{}{}?q=Nashville", server.uri(), API_PATH)).unwrap();
  let err = transport.fetch(&url).await.unwrap_err();

  assert!(matches!(err, Error::Timeout));
}

#[tokio::test]
async fn test_invalid_json_body_is_malformed_input() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path(API_PATH))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
    .mount(&server)
    .await;

  let registry = WeatherCacheRegistry::new();
  let err = service(&server, &registry)
    .lookup("Nashville")
    .await
    .unwrap_err();

  assert!(matches!(err, Error::MalformedInput(_)));
}
