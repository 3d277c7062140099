//! vigil-cache-core: Core traits and types for the vigil-cache library
//!
//! This crate provides the foundational types and traits used throughout
//! the vigil-cache ecosystem: the error taxonomy, the value codec, manager
//! configuration, the retry policy primitive, and the store connector seam.

mod codec;
mod config;
mod error;
mod retry;
mod traits;
mod types;

pub use codec::CacheValue;
pub use config::ManagerConfig;
pub use error::{CacheError, ConfigError, Result};
pub use retry::{Backoff, RetryPolicy};
pub use traits::*;
pub use types::*;
