// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! In-memory caches whose entries expire independently, shared between
//! owners through a reference-counted registry.

pub mod registry;
pub mod timed;

pub use registry::{CacheHandle, CacheRegistry};
pub use timed::TimedCache;
