//! Global Slot - Process-Wide Resource Without a Handle
//!
//! The SRL bundle is loaded into engine-global state: loading yields no
//! handle, only a status. Only one such global may be active per process,
//! so at most one manager should own an SRL slot that is loaded.
//!
//! Unlike handle slots, releasing can fail. A failed release leaves the
//! slot loaded so that the next release retries. The slot does not
//! release itself on drop; its owner decides how many attempts to make.

use std::path::Path;
use tracing::{debug, error, info};

use super::{GlobalEngine, Locator, ResourceKind};
use crate::error::ResourceError;

pub struct GlobalSlot<G: GlobalEngine> {
    kind: ResourceKind,
    engine: G,
    loaded: bool,
}

impl<G: GlobalEngine> GlobalSlot<G> {
    pub fn new(kind: ResourceKind, engine: G) -> Self {
        Self {
            kind,
            engine,
            loaded: false,
        }
    }

    /// Load the global resource unless it is already loaded.
    pub fn load(&mut self, data_folder: &Path) -> Result<(), ResourceError> {
        if self.loaded {
            debug!(kind = %self.kind, "Resource already loaded, skipping");
            return Ok(());
        }

        if Locator::is_unset(data_folder) {
            error!(kind = %self.kind, "Refusing to load from an empty locator");
            return Err(ResourceError::EmptyLocator { kind: self.kind });
        }

        info!("Loading {} resource from \"{}\"", self.kind, data_folder.display());

        if let Err(source) = self.engine.load(data_folder) {
            error!(
                "Failed to load {} resource from \"{}\": {}",
                self.kind,
                data_folder.display(),
                source
            );
            return Err(ResourceError::LoadFailed {
                kind: self.kind,
                locator: data_folder.describe(),
                source,
            });
        }

        self.loaded = true;
        info!("{} resource is loaded.", self.kind);
        Ok(())
    }

    /// Release the global resource if loaded.
    ///
    /// On engine failure the slot stays loaded and the error is returned;
    /// calling again retries the release.
    pub fn release(&mut self) -> Result<(), ResourceError> {
        if !self.loaded {
            return Ok(());
        }

        if let Err(source) = self.engine.release() {
            error!("Failed to release {} resource: {}", self.kind, source);
            return Err(ResourceError::ReleaseFailed {
                kind: self.kind,
                source,
            });
        }

        self.loaded = false;
        info!("{} is released", self.kind);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}
