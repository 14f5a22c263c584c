//! Engine module - Capabilities of the external model engines
//!
//! The manager never looks inside a model. Each engine is reachable only
//! through a create/destroy pair ([`Engine`]) or, for the process-wide SRL
//! bundle, a load/release pair with no handle ([`GlobalEngine`]).
//!
//! [`EngineSuite`] names one engine type per slot so every slot keeps its
//! own handle type and locator shape.

pub mod global;
pub mod slot;

pub use global::GlobalSlot;
pub use slot::{ManagedSlot, SlotState};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::EngineFailure;

/// The fixed set of resource slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Segmentor,
    Postagger,
    Recognizer,
    Parser,
    SemanticParser,
    LstmSemanticParser,
    Srl,
}

impl ResourceKind {
    /// Order in which the manager releases slots on teardown.
    pub const TEARDOWN_ORDER: [ResourceKind; 7] = [
        ResourceKind::Segmentor,
        ResourceKind::Postagger,
        ResourceKind::Recognizer,
        ResourceKind::Parser,
        ResourceKind::SemanticParser,
        ResourceKind::LstmSemanticParser,
        ResourceKind::Srl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Segmentor => "segmentor",
            Self::Postagger => "postagger",
            Self::Recognizer => "named entity recognizer",
            Self::Parser => "parser",
            Self::SemanticParser => "semantic parser",
            Self::LstmSemanticParser => "lstm semantic parser",
            Self::Srl => "SRL",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that identifies serialized model data on disk.
pub trait Locator {
    /// `true` when a required identifier is empty.
    fn is_unset(&self) -> bool;

    /// Human-readable form for logs and errors.
    fn describe(&self) -> String;
}

impl Locator for Path {
    fn is_unset(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

/// A model file with an optional auxiliary lexicon.
///
/// The manager passes both through untouched; it does not check one
/// against the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub lexicon: Option<PathBuf>,
}

impl ModelFiles {
    pub fn model(model: impl AsRef<Path>) -> Self {
        Self {
            model: model.as_ref().to_path_buf(),
            lexicon: None,
        }
    }

    pub fn with_lexicon(model: impl AsRef<Path>, lexicon: impl AsRef<Path>) -> Self {
        Self {
            model: model.as_ref().to_path_buf(),
            lexicon: Some(lexicon.as_ref().to_path_buf()),
        }
    }
}

impl Locator for ModelFiles {
    fn is_unset(&self) -> bool {
        self.model.as_os_str().is_empty()
            || self
                .lexicon
                .as_ref()
                .map_or(false, |lexicon| lexicon.as_os_str().is_empty())
    }

    fn describe(&self) -> String {
        match &self.lexicon {
            Some(lexicon) => format!("{} (lexicon: {})", self.model.display(), lexicon.display()),
            None => self.model.display().to_string(),
        }
    }
}

/// Create/destroy capability of a handle-producing engine.
pub trait Engine {
    /// Opaque model object owned by whichever slot holds it.
    type Handle;
    /// Shape of the load arguments.
    type Locator: Locator + ?Sized;

    fn create(&self, locator: &Self::Locator) -> Result<Self::Handle, EngineFailure>;

    /// Destroy a handle. Handle engines treat destruction as infallible.
    fn destroy(&self, handle: Self::Handle);
}

/// Load/release capability of a process-wide resource with no handle.
pub trait GlobalEngine {
    fn load(&self, data_folder: &Path) -> Result<(), EngineFailure>;

    fn release(&self) -> Result<(), EngineFailure>;
}

/// One engine type per slot.
pub trait EngineSuite {
    type Segmentor: Engine<Locator = ModelFiles>;
    type Postagger: Engine<Locator = ModelFiles>;
    type Recognizer: Engine<Locator = Path>;
    type Parser: Engine<Locator = Path>;
    type SemanticParser: Engine<Locator = Path>;
    type LstmSemanticParser: Engine<Locator = Path>;
    type Srl: GlobalEngine;
}

/// Engine values for constructing a [`ResourceManager`](crate::ResourceManager).
pub struct Engines<S: EngineSuite> {
    pub segmentor: S::Segmentor,
    pub postagger: S::Postagger,
    pub recognizer: S::Recognizer,
    pub parser: S::Parser,
    pub semantic_parser: S::SemanticParser,
    pub lstm_semantic_parser: S::LstmSemanticParser,
    pub srl: S::Srl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_order_covers_every_kind() {
        let order = ResourceKind::TEARDOWN_ORDER;
        assert_eq!(order.first(), Some(&ResourceKind::Segmentor));
        assert_eq!(order.last(), Some(&ResourceKind::Srl));
        for (i, kind) in order.iter().enumerate() {
            assert!(!order[i + 1..].contains(kind), "{kind} listed twice");
        }
    }

    #[test]
    fn test_model_files_emptiness() {
        assert!(!ModelFiles::model("cws.model").is_unset());
        assert!(ModelFiles::model("").is_unset());
        assert!(ModelFiles::with_lexicon("cws.model", "").is_unset());
        assert!(!ModelFiles::with_lexicon("cws.model", "lexicon.txt").is_unset());
    }

    #[test]
    fn test_model_files_describe() {
        let files = ModelFiles::with_lexicon("cws.model", "lexicon.txt");
        assert_eq!(files.describe(), "cws.model (lexicon: lexicon.txt)");
        assert_eq!(ModelFiles::model("pos.model").describe(), "pos.model");
    }

    #[test]
    fn test_path_locator() {
        assert!(Path::new("").is_unset());
        assert_eq!(Path::new("ltp_data/srl").describe(), "ltp_data/srl");
    }
}
