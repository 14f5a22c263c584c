//! Call-counting stand-ins for the external engines.
//!
//! Every engine writes into one shared [`CallLog`], so tests can assert how
//! often, and in which order, each capability was invoked. Any locator
//! containing "missing" makes the engine fail the load.

#![allow(dead_code)]

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};

use nlp_resource::{
    Engine, EngineFailure, EngineSuite, Engines, GlobalEngine, Locator, ModelFiles,
    ResourceKind, ResourceManager,
};

#[derive(Default)]
struct Log {
    created: HashMap<ResourceKind, usize>,
    destroyed: HashMap<ResourceKind, usize>,
    destroy_order: Vec<ResourceKind>,
    last_locator: HashMap<ResourceKind, String>,
    failing_srl_releases: usize,
}

#[derive(Default, Clone)]
pub struct CallLog {
    inner: Arc<Mutex<Log>>,
}

impl CallLog {
    pub fn created(&self, kind: ResourceKind) -> usize {
        self.inner.lock().unwrap().created.get(&kind).copied().unwrap_or(0)
    }

    pub fn destroyed(&self, kind: ResourceKind) -> usize {
        self.inner.lock().unwrap().destroyed.get(&kind).copied().unwrap_or(0)
    }

    pub fn destroy_order(&self) -> Vec<ResourceKind> {
        self.inner.lock().unwrap().destroy_order.clone()
    }

    pub fn last_locator(&self, kind: ResourceKind) -> Option<String> {
        self.inner.lock().unwrap().last_locator.get(&kind).cloned()
    }

    /// Make the next `n` SRL releases report failure.
    pub fn fail_srl_releases(&self, n: usize) {
        self.inner.lock().unwrap().failing_srl_releases = n;
    }

    fn record_create(&self, kind: ResourceKind, locator: String) {
        let mut log = self.inner.lock().unwrap();
        *log.created.entry(kind).or_default() += 1;
        log.last_locator.insert(kind, locator);
    }

    fn record_destroy(&self, kind: ResourceKind) {
        let mut log = self.inner.lock().unwrap();
        *log.destroyed.entry(kind).or_default() += 1;
        log.destroy_order.push(kind);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TestHandle {
    pub kind: ResourceKind,
    pub serial: usize,
}

pub struct CountingEngine<L: ?Sized> {
    kind: ResourceKind,
    log: CallLog,
    _locator: PhantomData<fn(&L)>,
}

impl<L: ?Sized> CountingEngine<L> {
    pub fn new(kind: ResourceKind, log: &CallLog) -> Self {
        Self {
            kind,
            log: log.clone(),
            _locator: PhantomData,
        }
    }
}

impl<L: Locator + ?Sized> Engine for CountingEngine<L> {
    type Handle = TestHandle;
    type Locator = L;

    fn create(&self, locator: &L) -> Result<TestHandle, EngineFailure> {
        let described = locator.describe();
        if described.contains("missing") {
            return Err(EngineFailure::NullHandle);
        }
        self.log.record_create(self.kind, described);
        Ok(TestHandle {
            kind: self.kind,
            serial: self.log.created(self.kind),
        })
    }

    fn destroy(&self, handle: TestHandle) {
        assert_eq!(handle.kind, self.kind, "handle destroyed by the wrong engine");
        self.log.record_destroy(self.kind);
    }
}

pub struct CountingBundle {
    log: CallLog,
}

impl GlobalEngine for CountingBundle {
    fn load(&self, data_folder: &Path) -> Result<(), EngineFailure> {
        let described = data_folder.describe();
        if described.contains("missing") {
            return Err(EngineFailure::Status(-1));
        }
        self.log.record_create(ResourceKind::Srl, described);
        Ok(())
    }

    fn release(&self) -> Result<(), EngineFailure> {
        self.log.record_destroy(ResourceKind::Srl);
        let mut log = self.log.inner.lock().unwrap();
        if log.failing_srl_releases > 0 {
            log.failing_srl_releases -= 1;
            return Err(EngineFailure::Status(1));
        }
        Ok(())
    }
}

pub enum TestSuite {}

impl EngineSuite for TestSuite {
    type Segmentor = CountingEngine<ModelFiles>;
    type Postagger = CountingEngine<ModelFiles>;
    type Recognizer = CountingEngine<Path>;
    type Parser = CountingEngine<Path>;
    type SemanticParser = CountingEngine<Path>;
    type LstmSemanticParser = CountingEngine<Path>;
    type Srl = CountingBundle;
}

/// A fresh manager wired to counting engines, plus their shared log.
pub fn counting_manager() -> (ResourceManager<TestSuite>, CallLog) {
    let log = CallLog::default();
    let engines = Engines::<TestSuite> {
        segmentor: CountingEngine::new(ResourceKind::Segmentor, &log),
        postagger: CountingEngine::new(ResourceKind::Postagger, &log),
        recognizer: CountingEngine::new(ResourceKind::Recognizer, &log),
        parser: CountingEngine::new(ResourceKind::Parser, &log),
        semantic_parser: CountingEngine::new(ResourceKind::SemanticParser, &log),
        lstm_semantic_parser: CountingEngine::new(ResourceKind::LstmSemanticParser, &log),
        srl: CountingBundle { log: log.clone() },
    };
    (ResourceManager::new(engines), log)
}

/// Load `kind` from `locator` through the manager's typed surface.
pub fn load(
    manager: &mut ResourceManager<TestSuite>,
    kind: ResourceKind,
    locator: &str,
) -> Result<(), nlp_resource::ResourceError> {
    match kind {
        ResourceKind::Segmentor => manager.load_segmentor(locator),
        ResourceKind::Postagger => manager.load_postagger(locator),
        ResourceKind::Recognizer => manager.load_recognizer(locator),
        ResourceKind::Parser => manager.load_parser(locator),
        ResourceKind::SemanticParser => manager.load_semantic_parser(locator),
        ResourceKind::LstmSemanticParser => manager.load_lstm_semantic_parser(locator),
        ResourceKind::Srl => manager.load_srl(locator),
    }
}

/// Whether the typed getter for `kind` currently yields a handle.
pub fn has_handle(manager: &ResourceManager<TestSuite>, kind: ResourceKind) -> bool {
    match kind {
        ResourceKind::Segmentor => manager.segmentor().is_some(),
        ResourceKind::Postagger => manager.postagger().is_some(),
        ResourceKind::Recognizer => manager.recognizer().is_some(),
        ResourceKind::Parser => manager.parser().is_some(),
        ResourceKind::SemanticParser => manager.semantic_parser().is_some(),
        ResourceKind::LstmSemanticParser => manager.lstm_semantic_parser().is_some(),
        ResourceKind::Srl => manager.is_srl_loaded(),
    }
}
