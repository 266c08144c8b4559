pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use config::{ConfigOverrides, CoreConfig};
pub use error::{CoreError, Result};
