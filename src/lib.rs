pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "cli")]
pub mod render;
pub mod utils;
#[cfg(feature = "dashboard")]
pub mod web;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use config::ResolverConfig;
pub use crate::core::{client::HttpLedgerClient, export::WalkExporter, walk::WalkSimulator};
pub use domain::model::{DecodeResult, WalkTrace};
pub use domain::ports::{LedgerApi, Storage};
pub use utils::error::{ResolverError, Result};
