pub mod client;
pub mod export;
pub mod graph;
pub mod normalize;
pub mod walk;

pub use crate::domain::model::{DecodeResult, DecodeSuccess, WalkTrace};
pub use crate::domain::ports::{LedgerApi, Storage};
pub use crate::utils::error::Result;
