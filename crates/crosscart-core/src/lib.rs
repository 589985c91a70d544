pub mod app_config;
pub mod compare;
pub mod config;
pub mod platform;
pub mod products;

pub use app_config::{AppConfig, Environment};
pub use compare::compare;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use platform::Platform;
pub use products::{ComparisonResult, ProductRecord};
