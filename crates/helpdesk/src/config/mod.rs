pub mod loader;
pub mod schema;

pub use loader::{config_path, load_config, load_config_from_str, CONFIG_ENV_VAR};
pub use schema::Config;
