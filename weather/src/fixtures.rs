// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::models::weather::{Coordinates, Main, Sys, WeatherCondition, WeatherRecord, Wind};

pub(crate) const CITY_NOT_FOUND: &str = r#"{"cod":"404","message":"city not found"}"#;

pub(crate) const NASHVILLE: &str = r#"{
  "coord": { "lon": -86.78, "lat": 36.17 },
  "sys": { "message": 0.0138, "country": "US", "sunrise": 1431427373, "sunset": 1431477841 },
  "weather": [ { "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" } ],
  "base": "stations",
  "main": { "temp": 289.847, "temp_min": 289.847, "temp_max": 289.847,
            "pressure": 1010.71, "sea_level": 1035.76, "grnd_level": 1010.71, "humidity": 76 },
  "wind": { "speed": 2.42, "deg": 310.002 },
  "clouds": { "all": 36 },
  "dt": 1431435983, "id": 4644585, "name": "Nashville", "cod": 200
}"#;

pub(crate) fn nashville() -> WeatherRecord {
  WeatherRecord {
    coordinates: Some(Coordinates {
      lon: -86.78,
      lat: 36.17,
    }),
    weather_conditions: vec![WeatherCondition {
      id: 802,
      main: "Clouds".into(),
      description: "scattered clouds".into(),
      icon: "03d".into(),
    }],
    base: Some("stations".into()),
    main: Some(Main {
      temperature: 289.847,
      pressure: 1010.71,
      humidity: 76,
    }),
    wind: Some(Wind {
      speed: 2.42,
      degree: 310.002,
    }),
    sys: Some(Sys {
      message: 0.0138,
      country: "US".into(),
      sunrise: 1431427373,
      sunset: 1431477841,
    }),
    clouds: Some(36),
    timestamp: Some(1431435983),
    location_id: Some(4644585),
    name: Some("Nashville".into()),
    status_code: Some(200),
    message: None,
  }
}
