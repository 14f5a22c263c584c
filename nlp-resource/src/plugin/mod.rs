//! Plugin System - Engines Backed by Native Shared Libraries
//!
//! Each model engine ships as a shared library exporting a C create/release
//! pair. This module opens those libraries with libloading, resolves the
//! symbols once, and exposes them through the [`Engine`] and
//! [`GlobalEngine`] capabilities.
//!
//! # Library Lifetime:
//! Every engine holds an `Arc<Library>`, so a library stays mapped for as
//! long as any engine (and therefore any handle) created from it lives.
//! The dependency parser and the first semantic parser share one library.

use libloading::Library;
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineLibraries;
use crate::engine::{Engine, EngineSuite, Engines, GlobalEngine, ModelFiles, ResourceKind};
use crate::error::{EngineFailure, ResourceError};
use crate::ffi::{
    check_status, path_to_cstring, CreateFn, CreateWithLexiconFn, GlobalLoadFn, GlobalReleaseFn,
    ReleaseFn, FFI_SUCCESS,
};

/// Names of the C entry points for one handle engine.
pub trait EngineSymbols {
    const KIND: ResourceKind;
    const CREATE: &'static str;
    const RELEASE: &'static str;
}

macro_rules! engine_symbols {
    ($(#[$doc:meta])* $name:ident, $kind:expr, $create:literal, $release:literal) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub enum $name {}

        impl EngineSymbols for $name {
            const KIND: ResourceKind = $kind;
            const CREATE: &'static str = $create;
            const RELEASE: &'static str = $release;
        }
    };
}

engine_symbols!(
    /// Word segmenter.
    Segmentor,
    ResourceKind::Segmentor,
    "segmentor_create_segmentor",
    "segmentor_release_segmentor"
);
engine_symbols!(
    /// Part-of-speech tagger.
    Postagger,
    ResourceKind::Postagger,
    "postagger_create_postagger",
    "postagger_release_postagger"
);
engine_symbols!(
    /// Named entity recognizer.
    Recognizer,
    ResourceKind::Recognizer,
    "ner_create_recognizer",
    "ner_release_recognizer"
);
engine_symbols!(
    /// Dependency parser.
    Parser,
    ResourceKind::Parser,
    "parser_create_parser",
    "parser_release_parser"
);
engine_symbols!(
    /// Semantic dependency parser built on the dependency parser engine.
    SemanticParser,
    ResourceKind::SemanticParser,
    "parser_create_parser",
    "parser_release_parser"
);
engine_symbols!(
    /// LSTM semantic dependency parser, loaded from a data directory.
    LstmSemanticParser,
    ResourceKind::LstmSemanticParser,
    "lstmsdparser_create_parser",
    "lstmsdparser_release_parser"
);

const SRL_LOAD: &str = "SRL_LoadResource";
const SRL_RELEASE: &str = "SRL_ReleaseResource";

/// Opaque model object created by engine `K`.
///
/// Only the engine that created it can destroy it. The pointer is never
/// dereferenced on the Rust side.
pub struct EngineHandle<K> {
    ptr: NonNull<c_void>,
    _kind: PhantomData<K>,
}

impl<K> EngineHandle<K> {
    /// Raw pointer for passing to the engine's analysis functions.
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

impl<K: EngineSymbols> fmt::Debug for EngineHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineHandle({}, {:p})", K::KIND, self.ptr)
    }
}

/// An opened engine shared library.
#[derive(Clone)]
pub struct EngineLibrary {
    path: PathBuf,
    library: Arc<Library>,
}

impl EngineLibrary {
    /// Open a shared library.
    ///
    /// # Safety Model:
    /// Opening runs the library's initializers. Libraries are expected to
    /// be the engine builds this crate was configured for.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref().to_path_buf();
        info!("Opening engine library {:?}", path);

        let library = unsafe { Library::new(&path) }.map_err(|source| ResourceError::Library {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            library: Arc::new(library),
        })
    }

    /// Resolve an exported function pointer.
    ///
    /// # Safety
    /// `T` must match the exported symbol's actual signature.
    unsafe fn symbol<T: Copy>(&self, name: &str) -> Result<T, ResourceError> {
        let symbol = self
            .library
            .get::<T>(name.as_bytes())
            .map_err(|source| ResourceError::MissingSymbol {
                path: self.path.clone(),
                symbol: name.to_string(),
                source,
            })?;
        debug!("Resolved '{}' in {:?}", name, self.path);
        Ok(*symbol)
    }
}

/// Engine whose creation function takes a model path and a nullable lexicon.
pub struct LexiconModelEngine<K> {
    _library: Arc<Library>,
    create: CreateWithLexiconFn,
    release: ReleaseFn,
    _kind: PhantomData<K>,
}

impl<K: EngineSymbols> LexiconModelEngine<K> {
    pub fn open(library: &EngineLibrary) -> Result<Self, ResourceError> {
        // SAFETY: signatures match the engine's exported C interface.
        let (create, release): (CreateWithLexiconFn, ReleaseFn) =
            unsafe { (library.symbol(K::CREATE)?, library.symbol(K::RELEASE)?) };
        Ok(Self {
            _library: library.library.clone(),
            create,
            release,
            _kind: PhantomData,
        })
    }
}

impl<K: EngineSymbols> Engine for LexiconModelEngine<K> {
    type Handle = EngineHandle<K>;
    type Locator = ModelFiles;

    fn create(&self, files: &ModelFiles) -> Result<Self::Handle, EngineFailure> {
        let model = path_to_cstring(&files.model)?;
        let lexicon = files.lexicon.as_deref().map(path_to_cstring).transpose()?;
        let lexicon_ptr = lexicon.as_ref().map_or(ptr::null(), |lexicon| lexicon.as_ptr());

        // SAFETY: both strings outlive the call; a null lexicon means "none".
        let raw = unsafe { (self.create)(model.as_ptr(), lexicon_ptr) };
        wrap_handle(raw)
    }

    fn destroy(&self, handle: Self::Handle) {
        // SAFETY: handle was produced by this engine's create function.
        let code = unsafe { (self.release)(handle.as_ptr()) };
        report_release_status(K::KIND, code);
    }
}

/// Engine whose creation function takes a single path (file or directory).
pub struct PathModelEngine<K> {
    _library: Arc<Library>,
    create: CreateFn,
    release: ReleaseFn,
    _kind: PhantomData<K>,
}

impl<K: EngineSymbols> PathModelEngine<K> {
    pub fn open(library: &EngineLibrary) -> Result<Self, ResourceError> {
        // SAFETY: signatures match the engine's exported C interface.
        let (create, release): (CreateFn, ReleaseFn) =
            unsafe { (library.symbol(K::CREATE)?, library.symbol(K::RELEASE)?) };
        Ok(Self {
            _library: library.library.clone(),
            create,
            release,
            _kind: PhantomData,
        })
    }
}

impl<K: EngineSymbols> Engine for PathModelEngine<K> {
    type Handle = EngineHandle<K>;
    type Locator = Path;

    fn create(&self, path: &Path) -> Result<Self::Handle, EngineFailure> {
        let path = path_to_cstring(path)?;
        // SAFETY: the string outlives the call.
        let raw = unsafe { (self.create)(path.as_ptr()) };
        wrap_handle(raw)
    }

    fn destroy(&self, handle: Self::Handle) {
        // SAFETY: handle was produced by this engine's create function.
        let code = unsafe { (self.release)(handle.as_ptr()) };
        report_release_status(K::KIND, code);
    }
}

/// The process-wide SRL resource.
pub struct SrlEngine {
    _library: Arc<Library>,
    load: GlobalLoadFn,
    release: GlobalReleaseFn,
}

impl SrlEngine {
    pub fn open(library: &EngineLibrary) -> Result<Self, ResourceError> {
        // SAFETY: signatures match the engine's exported C interface.
        let (load, release): (GlobalLoadFn, GlobalReleaseFn) =
            unsafe { (library.symbol(SRL_LOAD)?, library.symbol(SRL_RELEASE)?) };
        Ok(Self {
            _library: library.library.clone(),
            load,
            release,
        })
    }
}

impl GlobalEngine for SrlEngine {
    fn load(&self, data_folder: &Path) -> Result<(), EngineFailure> {
        let folder = path_to_cstring(data_folder)?;
        // SAFETY: the string outlives the call.
        check_status(unsafe { (self.load)(folder.as_ptr()) })
    }

    fn release(&self) -> Result<(), EngineFailure> {
        // SAFETY: no arguments; the engine tracks its own global state.
        check_status(unsafe { (self.release)() })
    }
}

fn wrap_handle<K>(raw: *mut c_void) -> Result<EngineHandle<K>, EngineFailure> {
    NonNull::new(raw)
        .map(|ptr| EngineHandle {
            ptr,
            _kind: PhantomData,
        })
        .ok_or(EngineFailure::NullHandle)
}

fn report_release_status(kind: ResourceKind, code: i32) {
    if code != FFI_SUCCESS {
        warn!("{} engine reported status {} on release", kind, code);
    }
}

/// Engines loaded from native shared libraries.
#[derive(Debug)]
pub enum DylibSuite {}

impl EngineSuite for DylibSuite {
    type Segmentor = LexiconModelEngine<Segmentor>;
    type Postagger = LexiconModelEngine<Postagger>;
    type Recognizer = PathModelEngine<Recognizer>;
    type Parser = PathModelEngine<Parser>;
    type SemanticParser = PathModelEngine<SemanticParser>;
    type LstmSemanticParser = PathModelEngine<LstmSemanticParser>;
    type Srl = SrlEngine;
}

impl DylibSuite {
    /// Open every engine library and resolve its entry points.
    ///
    /// Fails on the first library that cannot be opened or lacks a symbol.
    pub fn open(libraries: &EngineLibraries) -> Result<Engines<DylibSuite>, ResourceError> {
        let parser = EngineLibrary::open(&libraries.parser)?;

        let engines = Engines {
            segmentor: LexiconModelEngine::open(&EngineLibrary::open(&libraries.segmentor)?)?,
            postagger: LexiconModelEngine::open(&EngineLibrary::open(&libraries.postagger)?)?,
            recognizer: PathModelEngine::open(&EngineLibrary::open(&libraries.ner)?)?,
            parser: PathModelEngine::open(&parser)?,
            semantic_parser: PathModelEngine::open(&parser)?,
            lstm_semantic_parser: PathModelEngine::open(&EngineLibrary::open(
                &libraries.lstm_semantic_parser,
            )?)?,
            srl: SrlEngine::open(&EngineLibrary::open(&libraries.srl)?)?,
        };

        info!("All engine libraries opened");
        Ok(engines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_library_fails() {
        let err = EngineLibrary::open("/nonexistent/libsegmentor.so")
            .err()
            .expect("opening a missing library must fail");
        assert!(matches!(err, ResourceError::Library { .. }));
        assert!(err.kind().is_none());
    }

    #[test]
    fn test_suite_open_reports_first_missing_library() {
        let libraries = EngineLibraries {
            parser: PathBuf::from("/nonexistent/libparser.so"),
            ..EngineLibraries::default()
        };
        let err = DylibSuite::open(&libraries).err().expect("suite open must fail");
        match err {
            ResourceError::Library { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/libparser.so"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_pointer_is_load_failure() {
        let result = wrap_handle::<Parser>(ptr::null_mut());
        assert!(matches!(result, Err(EngineFailure::NullHandle)));
    }

    #[test]
    fn test_handle_wraps_pointer() {
        let mut model = 7u8;
        let raw = &mut model as *mut u8 as *mut c_void;
        let handle = wrap_handle::<Recognizer>(raw).unwrap();
        assert_eq!(handle.as_ptr(), raw);
        assert!(format!("{handle:?}").contains("named entity recognizer"));
    }

    #[test]
    fn test_semantic_parser_shares_parser_symbols() {
        assert_eq!(SemanticParser::CREATE, Parser::CREATE);
        assert_eq!(SemanticParser::RELEASE, Parser::RELEASE);
        assert_ne!(LstmSemanticParser::CREATE, Parser::CREATE);
    }
}
