// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! Streaming decoder for OpenWeather current-weather documents.
//!
//! The document is pulled token by token from the reader, never buffered as a
//! whole. Field names are matched exactly; anything unrecognized is consumed
//! and dropped, so new API fields never break decoding.

use crate::models::weather::{Coordinates, Main, Sys, WeatherCondition, WeatherRecord, Wind};
use error::Error;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::{fmt, io::Read, marker::PhantomData};
use tracing::{debug, trace};

/// Decodes a response body into weather records.
///
/// A top-level array yields one record per element (`[]` yields none); a
/// top-level object is a single record.
pub fn parse_stream<R: Read>(reader: R) -> Result<Vec<WeatherRecord>, Error> {
  let mut de = serde_json::Deserializer::from_reader(reader);
  let Reports(records) = Reports::deserialize(&mut de)?;
  de.end()?;
  debug!(records = records.len(), "decoded weather document");
  Ok(records)
}

trait FieldName: Sized {
  fn from_name(name: &str) -> Self;
}

/// Object key resolved to the field set of the enclosing object.
struct Key<F>(F);

impl<'de, F: FieldName> Deserialize<'de> for Key<F> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_identifier(KeyVisitor(PhantomData))
  }
}

struct KeyVisitor<F>(PhantomData<F>);

impl<'de, F: FieldName> Visitor<'de> for KeyVisitor<F> {
  type Value = Key<F>;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a field name")
  }

  fn visit_str<E: de::Error>(self, name: &str) -> Result<Key<F>, E> {
    Ok(Key(F::from_name(name)))
  }
}

fn skip_value<'de, A: MapAccess<'de>>(map: &mut A, scope: &str, name: &str) -> Result<(), A::Error> {
  trace!(scope, field = name, "skipping unrecognized field");
  map.next_value::<IgnoredAny>()?;
  Ok(())
}

fn drain_map<'de, A: MapAccess<'de>>(mut map: A) -> Result<(), A::Error> {
  while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
  Ok(())
}

fn drain_seq<'de, A: SeqAccess<'de>>(mut seq: A) -> Result<(), A::Error> {
  while seq.next_element::<IgnoredAny>()?.is_some() {}
  Ok(())
}

struct Reports(Vec<WeatherRecord>);

impl<'de> Deserialize<'de> for Reports {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(ReportsVisitor)
  }
}

struct ReportsVisitor;

impl<'de> Visitor<'de> for ReportsVisitor {
  type Value = Reports;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a weather report or an array of weather reports")
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Reports, A::Error> {
    let mut records = Vec::with_capacity(seq.size_hint().unwrap_or(0));
    while let Some(record) = seq.next_element::<WeatherRecord>()? {
      records.push(record);
    }
    Ok(Reports(records))
  }

  fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Reports, A::Error> {
    RecordVisitor.visit_map(map).map(|record| Reports(vec![record]))
  }
}

enum RecordField {
  Coord,
  Weather,
  Base,
  Main,
  Wind,
  Sys,
  Clouds,
  Dt,
  Id,
  Name,
  Cod,
  Message,
  Unknown(String),
}

impl FieldName for RecordField {
  fn from_name(name: &str) -> Self {
    match name {
      "coord" => Self::Coord,
      "weather" => Self::Weather,
      "base" => Self::Base,
      "main" => Self::Main,
      "wind" => Self::Wind,
      "sys" => Self::Sys,
      "clouds" => Self::Clouds,
      "dt" => Self::Dt,
      "id" => Self::Id,
      "name" => Self::Name,
      "cod" => Self::Cod,
      "message" => Self::Message,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for WeatherRecord {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(RecordVisitor)
  }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
  type Value = WeatherRecord;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a weather report object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WeatherRecord, A::Error> {
    let mut record = WeatherRecord::default();
    while let Some(Key(field)) = map.next_key::<Key<RecordField>>()? {
      match field {
        RecordField::Coord => record.coordinates = map.next_value()?,
        RecordField::Weather => {
          if let Conditions(Some(conditions)) = map.next_value()? {
            record.weather_conditions = conditions;
          }
        }
        RecordField::Base => record.base = map.next_value()?,
        RecordField::Main => record.main = map.next_value()?,
        RecordField::Wind => record.wind = map.next_value()?,
        RecordField::Sys => record.sys = map.next_value()?,
        RecordField::Clouds => {
          record.clouds = map.next_value::<Option<Clouds>>()?.and_then(|clouds| clouds.all)
        }
        RecordField::Dt => record.timestamp = map.next_value()?,
        RecordField::Id => record.location_id = map.next_value()?,
        RecordField::Name => record.name = map.next_value()?,
        RecordField::Cod => record.status_code = map.next_value::<StatusCode>()?.0,
        RecordField::Message => record.message = map.next_value::<Text>()?.0,
        RecordField::Unknown(name) => skip_value(&mut map, "record", &name)?,
      }
    }
    Ok(record)
  }
}

/// `weather` value: the condition list when it is an array, `None` for any
/// other shape.
struct Conditions(Option<Vec<WeatherCondition>>);

impl<'de> Deserialize<'de> for Conditions {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(ConditionsVisitor)
  }
}

struct ConditionsVisitor;

impl<'de> Visitor<'de> for ConditionsVisitor {
  type Value = Conditions;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("an array of weather conditions")
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Conditions, A::Error> {
    let mut conditions = Vec::with_capacity(seq.size_hint().unwrap_or(1));
    while let Some(condition) = seq.next_element::<WeatherCondition>()? {
      conditions.push(condition);
    }
    Ok(Conditions(Some(conditions)))
  }

  fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Conditions, A::Error> {
    trace!("skipping non-array weather field");
    drain_map(map)?;
    Ok(Conditions(None))
  }

  fn visit_bool<E: de::Error>(self, _: bool) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }

  fn visit_i64<E: de::Error>(self, _: i64) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }

  fn visit_u64<E: de::Error>(self, _: u64) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }

  fn visit_f64<E: de::Error>(self, _: f64) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }

  fn visit_str<E: de::Error>(self, _: &str) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }

  fn visit_unit<E: de::Error>(self) -> Result<Conditions, E> {
    Ok(Conditions(None))
  }
}

/// `cod` arrives as a number on success and as a string ("404") on errors.
struct StatusCode(Option<i64>);

impl<'de> Deserialize<'de> for StatusCode {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(StatusCodeVisitor)
  }
}

struct StatusCodeVisitor;

impl<'de> Visitor<'de> for StatusCodeVisitor {
  type Value = StatusCode;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a status code")
  }

  fn visit_i64<E: de::Error>(self, code: i64) -> Result<StatusCode, E> {
    Ok(StatusCode(Some(code)))
  }

  fn visit_u64<E: de::Error>(self, code: u64) -> Result<StatusCode, E> {
    Ok(StatusCode(i64::try_from(code).ok()))
  }

  fn visit_f64<E: de::Error>(self, _: f64) -> Result<StatusCode, E> {
    Ok(StatusCode(None))
  }

  fn visit_bool<E: de::Error>(self, _: bool) -> Result<StatusCode, E> {
    Ok(StatusCode(None))
  }

  fn visit_str<E: de::Error>(self, code: &str) -> Result<StatusCode, E> {
    Ok(StatusCode(code.trim().parse().ok()))
  }

  fn visit_unit<E: de::Error>(self) -> Result<StatusCode, E> {
    Ok(StatusCode(None))
  }

  fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<StatusCode, A::Error> {
    drain_map(map)?;
    Ok(StatusCode(None))
  }

  fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<StatusCode, A::Error> {
    drain_seq(seq)?;
    Ok(StatusCode(None))
  }
}

/// Top-level `message`: kept only when it is a string.
struct Text(Option<String>);

impl<'de> Deserialize<'de> for Text {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(TextVisitor)
  }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
  type Value = Text;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a message string")
  }

  fn visit_str<E: de::Error>(self, text: &str) -> Result<Text, E> {
    Ok(Text(Some(text.to_string())))
  }

  fn visit_string<E: de::Error>(self, text: String) -> Result<Text, E> {
    Ok(Text(Some(text)))
  }

  fn visit_i64<E: de::Error>(self, _: i64) -> Result<Text, E> {
    Ok(Text(None))
  }

  fn visit_u64<E: de::Error>(self, _: u64) -> Result<Text, E> {
    Ok(Text(None))
  }

  fn visit_f64<E: de::Error>(self, _: f64) -> Result<Text, E> {
    Ok(Text(None))
  }

  fn visit_bool<E: de::Error>(self, _: bool) -> Result<Text, E> {
    Ok(Text(None))
  }

  fn visit_unit<E: de::Error>(self) -> Result<Text, E> {
    Ok(Text(None))
  }

  fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Text, A::Error> {
    drain_map(map)?;
    Ok(Text(None))
  }

  fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Text, A::Error> {
    drain_seq(seq)?;
    Ok(Text(None))
  }
}

enum ConditionField {
  Id,
  Main,
  Description,
  Icon,
  Unknown(String),
}

impl FieldName for ConditionField {
  fn from_name(name: &str) -> Self {
    match name {
      "id" => Self::Id,
      "main" => Self::Main,
      "description" => Self::Description,
      "icon" => Self::Icon,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for WeatherCondition {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(ConditionVisitor)
  }
}

struct ConditionVisitor;

impl<'de> Visitor<'de> for ConditionVisitor {
  type Value = WeatherCondition;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a weather condition object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WeatherCondition, A::Error> {
    let mut condition = WeatherCondition::default();
    while let Some(Key(field)) = map.next_key::<Key<ConditionField>>()? {
      match field {
        ConditionField::Id => condition.id = map.next_value()?,
        ConditionField::Main => condition.main = map.next_value()?,
        ConditionField::Description => condition.description = map.next_value()?,
        ConditionField::Icon => condition.icon = map.next_value()?,
        ConditionField::Unknown(name) => skip_value(&mut map, "weather", &name)?,
      }
    }
    Ok(condition)
  }
}

enum MainField {
  Temp,
  Pressure,
  Humidity,
  /// Known to the API but not kept.
  Discarded,
  Unknown(String),
}

impl FieldName for MainField {
  fn from_name(name: &str) -> Self {
    match name {
      "temp" => Self::Temp,
      "pressure" => Self::Pressure,
      "humidity" => Self::Humidity,
      "temp_min" | "temp_max" | "sea_level" | "grnd_level" => Self::Discarded,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for Main {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(MainVisitor)
  }
}

struct MainVisitor;

impl<'de> Visitor<'de> for MainVisitor {
  type Value = Main;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a main readings object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Main, A::Error> {
    let mut main = Main::default();
    while let Some(Key(field)) = map.next_key::<Key<MainField>>()? {
      match field {
        MainField::Temp => main.temperature = map.next_value()?,
        MainField::Pressure => main.pressure = map.next_value()?,
        MainField::Humidity => main.humidity = map.next_value()?,
        MainField::Discarded => {
          map.next_value::<IgnoredAny>()?;
        }
        MainField::Unknown(name) => skip_value(&mut map, "main", &name)?,
      }
    }
    Ok(main)
  }
}

enum WindField {
  Speed,
  Deg,
  Unknown(String),
}

impl FieldName for WindField {
  fn from_name(name: &str) -> Self {
    match name {
      "speed" => Self::Speed,
      "deg" => Self::Deg,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for Wind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(WindVisitor)
  }
}

struct WindVisitor;

impl<'de> Visitor<'de> for WindVisitor {
  type Value = Wind;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a wind object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Wind, A::Error> {
    let mut wind = Wind::default();
    while let Some(Key(field)) = map.next_key::<Key<WindField>>()? {
      match field {
        WindField::Speed => wind.speed = map.next_value()?,
        WindField::Deg => wind.degree = map.next_value()?,
        WindField::Unknown(name) => skip_value(&mut map, "wind", &name)?,
      }
    }
    Ok(wind)
  }
}

enum SysField {
  Message,
  Country,
  Sunrise,
  Sunset,
  Unknown(String),
}

impl FieldName for SysField {
  fn from_name(name: &str) -> Self {
    match name {
      "message" => Self::Message,
      "country" => Self::Country,
      "sunrise" => Self::Sunrise,
      "sunset" => Self::Sunset,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for Sys {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(SysVisitor)
  }
}

struct SysVisitor;

impl<'de> Visitor<'de> for SysVisitor {
  type Value = Sys;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a sys object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Sys, A::Error> {
    let mut sys = Sys::default();
    while let Some(Key(field)) = map.next_key::<Key<SysField>>()? {
      match field {
        SysField::Message => sys.message = map.next_value()?,
        SysField::Country => sys.country = map.next_value()?,
        SysField::Sunrise => sys.sunrise = map.next_value()?,
        SysField::Sunset => sys.sunset = map.next_value()?,
        SysField::Unknown(name) => skip_value(&mut map, "sys", &name)?,
      }
    }
    Ok(sys)
  }
}

enum CoordField {
  Lon,
  Lat,
  Unknown(String),
}

impl FieldName for CoordField {
  fn from_name(name: &str) -> Self {
    match name {
      "lon" => Self::Lon,
      "lat" => Self::Lat,
      other => Self::Unknown(other.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for Coordinates {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(CoordVisitor)
  }
}

struct CoordVisitor;

impl<'de> Visitor<'de> for CoordVisitor {
  type Value = Coordinates;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a coordinates object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Coordinates, A::Error> {
    let mut coordinates = Coordinates::default();
    while let Some(Key(field)) = map.next_key::<Key<CoordField>>()? {
      match field {
        CoordField::Lon => coordinates.lon = map.next_value()?,
        CoordField::Lat => coordinates.lat = map.next_value()?,
        CoordField::Unknown(name) => skip_value(&mut map, "coord", &name)?,
      }
    }
    Ok(coordinates)
  }
}

struct Clouds {
  all: Option<i64>,
}

impl<'de> Deserialize<'de> for Clouds {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(CloudsVisitor)
  }
}

struct CloudsVisitor;

impl<'de> Visitor<'de> for CloudsVisitor {
  type Value = Clouds;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a clouds object")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Clouds, A::Error> {
    let mut clouds = Clouds { all: None };
    while let Some(name) = map.next_key::<String>()? {
      if name == "all" {
        clouds.all = Some(map.next_value()?);
      } else {
        skip_value(&mut map, "clouds", &name)?;
      }
    }
    Ok(clouds)
  }
}
