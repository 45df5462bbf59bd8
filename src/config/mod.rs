#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, OutputFormat};
pub use toml_config::{ApiConfig, ResolverConfig, ServerConfig, WalkConfig};
