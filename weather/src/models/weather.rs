// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// One current-weather report as returned by the OpenWeather `weather` endpoint.
///
/// Serializes back into the wire shape it was decoded from; absent fields are
/// omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeatherRecord {
  #[serde(rename = "coord", skip_serializing_if = "Option::is_none")]
  pub coordinates: Option<Coordinates>,
  #[serde(rename = "weather")]
  pub weather_conditions: Vec<WeatherCondition>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub main: Option<Main>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub wind: Option<Wind>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sys: Option<Sys>,
  #[serde(
    serialize_with = "serialize_clouds",
    skip_serializing_if = "Option::is_none"
  )]
  pub clouds: Option<i64>,
  #[serde(rename = "dt", skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<i64>,
  #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
  pub location_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "cod", skip_serializing_if = "Option::is_none")]
  pub status_code: Option<i64>,
  /// Only present on error responses, e.g. "city not found".
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coordinates {
  pub lon: f64,
  pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeatherCondition {
  pub id: i64,
  pub main: String,
  pub description: String,
  pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Main {
  #[serde(rename = "temp")]
  pub temperature: f64,
  pub pressure: f64,
  pub humidity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Wind {
  pub speed: f64,
  #[serde(rename = "deg")]
  pub degree: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Sys {
  pub message: f64,
  pub country: String,
  pub sunrise: i64,
  pub sunset: i64,
}

impl WeatherRecord {
  /// The API-level failure this record reports, if any.
  pub fn api_error(&self) -> Option<&str> {
    self.message.as_deref().filter(|message| !message.is_empty())
  }

  pub fn observed_at(&self) -> Option<DateTime<Utc>> {
    self.timestamp.and_then(unix_to_utc)
  }
}

impl Sys {
  pub fn sunrise_at(&self) -> Option<DateTime<Utc>> {
    unix_to_utc(self.sunrise)
  }

  pub fn sunset_at(&self) -> Option<DateTime<Utc>> {
    unix_to_utc(self.sunset)
  }
}

fn unix_to_utc(secs: i64) -> Option<DateTime<Utc>> {
  Utc.timestamp_opt(secs, 0).single()
}

#[derive(Serialize)]
struct Clouds {
  all: i64,
}

fn serialize_clouds<S: Serializer>(clouds: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
  clouds.map(|all| Clouds { all }).serialize(serializer)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_error_needs_non_empty_message() {
    let mut record = WeatherRecord::default();
    assert_eq!(record.api_error(), None);

    record.message = Some(String::new());
    assert_eq!(record.api_error(), None);

    record.message = Some("  ".into());
    assert_eq!(record.api_error(), Some("  "));

    record.message = Some("city not found".into());
    assert_eq!(record.api_error(), Some("city not found"));
  }

  #[test]
  fn test_timestamps_convert_to_utc() {
    let record = WeatherRecord {
      timestamp: Some(1431435983),
      sys: Some(Sys {
        sunrise: 1431427373,
        sunset: 1431477841,
        ..Default::default()
      }),
      ..Default::default()
    };

    let observed = record.observed_at().unwrap();
    assert_eq!(observed.to_rfc3339(), "2015-05-12T13:06:23+00:00");

    let sys = record.sys.as_ref().unwrap();
    assert!(sys.sunrise_at().unwrap() < observed);
    assert!(sys.sunset_at().unwrap() > observed);
  }

  #[test]
  fn test_serializes_wire_field_names() {
    let record = WeatherRecord {
      main: Some(Main {
        temperature: 289.5,
        pressure: 1010.0,
        humidity: 76,
      }),
      wind: Some(Wind {
        speed: 2.0,
        degree: 310.0,
      }),
      clouds: Some(36),
      timestamp: Some(1),
      location_id: Some(2),
      status_code: Some(200),
      ..Default::default()
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["main"]["temp"], 289.5);
    assert_eq!(value["wind"]["deg"], 310.0);
    assert_eq!(value["clouds"]["all"], 36);
    assert_eq!(value["dt"], 1);
    assert_eq!(value["id"], 2);
    assert_eq!(value["cod"], 200);
    assert_eq!(value["weather"], serde_json::json!([]));
    assert!(value.get("message").is_none());
    assert!(value.get("coord").is_none());
  }
}
