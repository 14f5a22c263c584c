//! NLP Resource - Lifecycle Manager for Model Resources
//!
//! Loading a segmenter, tagger, recognizer, parser or SRL bundle takes
//! seconds, and every analysis request reuses the same loaded models. This
//! crate owns those models on behalf of an analysis pipeline.
//!
//! # Guarantees:
//! - A resource is never created twice without an intervening release
//! - A resource is never destroyed twice, nor destroyed if never loaded
//! - A failed load leaves the slot absent and retryable
//! - Dropping the manager releases every loaded slot in a fixed order
//!
//! The engines themselves are external; see [`engine::Engine`] and the
//! shared-library backed implementations in [`plugin`].

pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod manager;
pub mod plugin;

pub use config::{EngineLibraries, ResourceConfig};
pub use engine::{
    Engine, EngineSuite, Engines, GlobalEngine, GlobalSlot, Locator, ManagedSlot, ModelFiles,
    ResourceKind, SlotState,
};
pub use error::{EngineFailure, ResourceError};
pub use manager::ResourceManager;
pub use plugin::{DylibSuite, EngineHandle, EngineLibrary};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it again after a
/// subscriber is installed is a no-op.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}
