pub mod data;
pub mod io;
pub mod keys;

pub use data::{path_display, Config, DEFAULT_API_BASE_URL};
pub use io::ConfigError;
pub use keys::ConfigKey;
