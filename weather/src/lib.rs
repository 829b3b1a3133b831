// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
pub mod config;
pub mod models;
pub mod parser;
pub mod service;
pub mod transport;

#[cfg(test)]
mod fixtures;

pub use crate::config::WeatherConfig;
pub use crate::models::weather::{Coordinates, Main, Sys, WeatherCondition, WeatherRecord, Wind};
pub use crate::parser::parse_stream;
pub use crate::service::{WeatherCacheRegistry, WeatherService};
pub use crate::transport::{HttpTransport, Transport};
