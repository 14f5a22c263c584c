//! Error types for resource management.
//!
//! Engine-side failures ([`EngineFailure`]) are wrapped into
//! [`ResourceError`] together with the slot and locator involved. Every
//! error is recoverable: the manager is left in a well-defined state and
//! the caller may retry.

use std::ffi::NulError;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::ResourceKind;
use crate::ffi::{FfiResult, FFI_ERROR};

/// A failure reported by an external engine capability.
#[derive(Debug, Error)]
pub enum EngineFailure {
    #[error("engine returned a null handle")]
    NullHandle,

    #[error("engine reported status {0}")]
    Status(FfiResult),

    #[error("locator is not representable as a C string: {0}")]
    InvalidLocator(#[from] NulError),

    #[error("locator {0:?} is not valid UTF-8")]
    NonUtf8Locator(PathBuf),
}

/// Errors surfaced by the resource manager.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("empty locator for {kind}")]
    EmptyLocator { kind: ResourceKind },

    #[error("failed to load {kind} from \"{locator}\"")]
    LoadFailed {
        kind: ResourceKind,
        locator: String,
        #[source]
        source: EngineFailure,
    },

    #[error("failed to release {kind}")]
    ReleaseFailed {
        kind: ResourceKind,
        #[source]
        source: EngineFailure,
    },

    #[error("failed to open engine library {path:?}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("engine library {path:?} is missing symbol '{symbol}'")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

impl ResourceError {
    /// Negative C status code for callers that speak the integer protocol.
    pub fn status(&self) -> FfiResult {
        FFI_ERROR
    }

    /// The slot this error concerns, if any.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::EmptyLocator { kind }
            | Self::LoadFailed { kind, .. }
            | Self::ReleaseFailed { kind, .. } => Some(*kind),
            Self::Library { .. } | Self::MissingSymbol { .. } => None,
        }
    }
}
