//! Managed Slot - Idempotent Ownership of One Engine Handle
//!
//! A slot is either [`SlotState::Absent`] or [`SlotState::Loaded`] with the
//! handle inside. There is no separate "loaded" flag to fall out of sync
//! with the handle: loadedness is the variant.
//!
//! # Lifecycle:
//! ```text
//! Absent --load ok--> Loaded --release--> Absent
//!   |  ^                 |
//!   +--+ load failed     +-- load: no-op
//! ```

use tracing::{debug, error, info};

use super::{Engine, Locator, ResourceKind};
use crate::error::ResourceError;

/// Current contents of a slot.
#[derive(Debug)]
pub enum SlotState<H> {
    Absent,
    Loaded(H),
}

impl<H> SlotState<H> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn handle(&self) -> Option<&H> {
        match self {
            Self::Loaded(handle) => Some(handle),
            Self::Absent => None,
        }
    }
}

/// One independently loadable resource backed by engine `E`.
pub struct ManagedSlot<E: Engine> {
    kind: ResourceKind,
    engine: E,
    state: SlotState<E::Handle>,
}

impl<E: Engine> ManagedSlot<E> {
    /// Create an empty slot. The engine is not called.
    pub fn new(kind: ResourceKind, engine: E) -> Self {
        Self {
            kind,
            engine,
            state: SlotState::Absent,
        }
    }

    /// Load the resource unless it is already loaded.
    ///
    /// A redundant call returns `Ok(())` without touching the engine, so
    /// a live handle is never overwritten. On failure the slot stays
    /// `Absent` and can be retried with another locator.
    pub fn load(&mut self, locator: &E::Locator) -> Result<(), ResourceError> {
        if self.state.is_loaded() {
            debug!(kind = %self.kind, "Resource already loaded, skipping");
            return Ok(());
        }

        if Locator::is_unset(locator) {
            error!(kind = %self.kind, "Refusing to load from an empty locator");
            return Err(ResourceError::EmptyLocator { kind: self.kind });
        }

        let described = locator.describe();
        info!("Loading {} model from \"{}\" ...", self.kind, described);

        match self.engine.create(locator) {
            Ok(handle) => {
                self.state = SlotState::Loaded(handle);
                info!("{} model is loaded.", self.kind);
                Ok(())
            }
            Err(source) => {
                error!("Failed to load {} model from \"{}\": {}", self.kind, described, source);
                Err(ResourceError::LoadFailed {
                    kind: self.kind,
                    locator: described,
                    source,
                })
            }
        }
    }

    /// Destroy the handle if one is held; otherwise do nothing.
    pub fn release(&mut self) {
        if let SlotState::Loaded(handle) = std::mem::replace(&mut self.state, SlotState::Absent) {
            self.engine.destroy(handle);
            info!("{} model is released.", self.kind);
        }
    }

    /// Current handle, `None` while absent.
    pub fn get(&self) -> Option<&E::Handle> {
        self.state.handle()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn state(&self) -> &SlotState<E::Handle> {
        &self.state
    }
}

impl<E: Engine> Drop for ManagedSlot<E> {
    fn drop(&mut self) {
        self.release();
    }
}
