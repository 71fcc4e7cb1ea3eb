pub mod config;
mod constructors;
pub mod entities;
pub mod fixtures;
pub mod repositories;
pub mod services;
pub mod storage;
pub(crate) mod utils;

pub use config::{Config, LatencyConfig};
pub use constructors::*;
pub use fixtures::Fixtures;
pub use services::Services;
