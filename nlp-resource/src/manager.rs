//! Resource Manager - Gatekeeper for the Seven Model Resources
//!
//! Owns one slot per model kind. Loads and releases are idempotent, a
//! failed load leaves the slot retryable, and dropping the manager
//! releases every slot in [`ResourceKind::TEARDOWN_ORDER`].
//!
//! # Concurrency Contract:
//! The manager has no internal locking. Loading and releasing take
//! `&mut self`, so mutation is serialized by whoever owns the manager;
//! getters take `&self` and may be shared once loading is done.

use std::path::Path;
use tracing::{error, info};

use crate::config::ResourceConfig;
use crate::engine::{
    Engine, EngineSuite, Engines, GlobalSlot, ManagedSlot, ModelFiles, ResourceKind,
};
use crate::error::ResourceError;

type Handle<E> = <E as Engine>::Handle;

pub struct ResourceManager<S: EngineSuite> {
    segmentor: ManagedSlot<S::Segmentor>,
    postagger: ManagedSlot<S::Postagger>,
    recognizer: ManagedSlot<S::Recognizer>,
    parser: ManagedSlot<S::Parser>,
    semantic_parser: ManagedSlot<S::SemanticParser>,
    lstm_semantic_parser: ManagedSlot<S::LstmSemanticParser>,
    srl: GlobalSlot<S::Srl>,
}

impl<S: EngineSuite> ResourceManager<S> {
    /// Create a manager with every slot absent.
    pub fn new(engines: Engines<S>) -> Self {
        Self {
            segmentor: ManagedSlot::new(ResourceKind::Segmentor, engines.segmentor),
            postagger: ManagedSlot::new(ResourceKind::Postagger, engines.postagger),
            recognizer: ManagedSlot::new(ResourceKind::Recognizer, engines.recognizer),
            parser: ManagedSlot::new(ResourceKind::Parser, engines.parser),
            semantic_parser: ManagedSlot::new(ResourceKind::SemanticParser, engines.semantic_parser),
            lstm_semantic_parser: ManagedSlot::new(
                ResourceKind::LstmSemanticParser,
                engines.lstm_semantic_parser,
            ),
            srl: GlobalSlot::new(ResourceKind::Srl, engines.srl),
        }
    }

    // -- Segmentor --------------------------------------------------------

    pub fn load_segmentor(&mut self, model: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.segmentor.load(&ModelFiles::model(model))
    }

    pub fn load_segmentor_with_lexicon(
        &mut self,
        model: impl AsRef<Path>,
        lexicon: impl AsRef<Path>,
    ) -> Result<(), ResourceError> {
        self.segmentor.load(&ModelFiles::with_lexicon(model, lexicon))
    }

    pub fn release_segmentor(&mut self) {
        self.segmentor.release();
    }

    pub fn segmentor(&self) -> Option<&Handle<S::Segmentor>> {
        self.segmentor.get()
    }

    // -- Postagger --------------------------------------------------------

    pub fn load_postagger(&mut self, model: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.postagger.load(&ModelFiles::model(model))
    }

    pub fn load_postagger_with_lexicon(
        &mut self,
        model: impl AsRef<Path>,
        lexicon: impl AsRef<Path>,
    ) -> Result<(), ResourceError> {
        self.postagger.load(&ModelFiles::with_lexicon(model, lexicon))
    }

    pub fn release_postagger(&mut self) {
        self.postagger.release();
    }

    pub fn postagger(&self) -> Option<&Handle<S::Postagger>> {
        self.postagger.get()
    }

    // -- Named entity recognizer ------------------------------------------

    pub fn load_recognizer(&mut self, model: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.recognizer.load(model.as_ref())
    }

    pub fn release_recognizer(&mut self) {
        self.recognizer.release();
    }

    pub fn recognizer(&self) -> Option<&Handle<S::Recognizer>> {
        self.recognizer.get()
    }

    // -- Dependency parser ------------------------------------------------

    pub fn load_parser(&mut self, model: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.parser.load(model.as_ref())
    }

    pub fn release_parser(&mut self) {
        self.parser.release();
    }

    pub fn parser(&self) -> Option<&Handle<S::Parser>> {
        self.parser.get()
    }

    // -- Semantic dependency parser ---------------------------------------

    pub fn load_semantic_parser(&mut self, model: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.semantic_parser.load(model.as_ref())
    }

    pub fn release_semantic_parser(&mut self) {
        self.semantic_parser.release();
    }

    pub fn semantic_parser(&self) -> Option<&Handle<S::SemanticParser>> {
        self.semantic_parser.get()
    }

    // -- LSTM semantic dependency parser ----------------------------------

    pub fn load_lstm_semantic_parser(
        &mut self,
        data_dir: impl AsRef<Path>,
    ) -> Result<(), ResourceError> {
        self.lstm_semantic_parser.load(data_dir.as_ref())
    }

    pub fn release_lstm_semantic_parser(&mut self) {
        self.lstm_semantic_parser.release();
    }

    pub fn lstm_semantic_parser(&self) -> Option<&Handle<S::LstmSemanticParser>> {
        self.lstm_semantic_parser.get()
    }

    // -- SRL bundle -------------------------------------------------------

    /// Load the process-wide SRL resource. Only one manager per process
    /// should hold it loaded.
    pub fn load_srl(&mut self, data_folder: impl AsRef<Path>) -> Result<(), ResourceError> {
        self.srl.load(data_folder.as_ref())
    }

    /// Release the SRL resource. On failure it stays loaded and a later
    /// call retries.
    pub fn release_srl(&mut self) -> Result<(), ResourceError> {
        self.srl.release()
    }

    pub fn is_srl_loaded(&self) -> bool {
        self.srl.is_loaded()
    }

    // -- Whole-manager operations -----------------------------------------

    pub fn is_loaded(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Segmentor => self.segmentor.is_loaded(),
            ResourceKind::Postagger => self.postagger.is_loaded(),
            ResourceKind::Recognizer => self.recognizer.is_loaded(),
            ResourceKind::Parser => self.parser.is_loaded(),
            ResourceKind::SemanticParser => self.semantic_parser.is_loaded(),
            ResourceKind::LstmSemanticParser => self.lstm_semantic_parser.is_loaded(),
            ResourceKind::Srl => self.srl.is_loaded(),
        }
    }

    /// Loaded slots, in teardown order.
    pub fn loaded_kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::TEARDOWN_ORDER
            .into_iter()
            .filter(|kind| self.is_loaded(*kind))
            .collect()
    }

    /// Release a single slot by kind.
    pub fn release(&mut self, kind: ResourceKind) -> Result<(), ResourceError> {
        match kind {
            ResourceKind::Segmentor => self.segmentor.release(),
            ResourceKind::Postagger => self.postagger.release(),
            ResourceKind::Recognizer => self.recognizer.release(),
            ResourceKind::Parser => self.parser.release(),
            ResourceKind::SemanticParser => self.semantic_parser.release(),
            ResourceKind::LstmSemanticParser => self.lstm_semantic_parser.release(),
            ResourceKind::Srl => return self.srl.release(),
        }
        Ok(())
    }

    /// Release every slot in teardown order.
    ///
    /// A failing slot does not stop the sweep; its error is collected and
    /// the remaining slots are still released.
    pub fn release_all(&mut self) -> Vec<ResourceError> {
        ResourceKind::TEARDOWN_ORDER
            .into_iter()
            .filter_map(|kind| self.release(kind).err())
            .collect()
    }

    /// Load every slot that has a locator in `config`, in teardown order.
    ///
    /// Stops at the first failure. Slots loaded before the failure stay
    /// loaded; the failing slot stays absent.
    pub fn load_from_config(
        &mut self,
        config: &ResourceConfig,
    ) -> Result<Vec<ResourceKind>, ResourceError> {
        let mut loaded = Vec::new();

        if let Some(model) = &config.segmentor_model {
            match &config.segmentor_lexicon {
                Some(lexicon) => self.load_segmentor_with_lexicon(model, lexicon)?,
                None => self.load_segmentor(model)?,
            }
            loaded.push(ResourceKind::Segmentor);
        }
        if let Some(model) = &config.postagger_model {
            match &config.postagger_lexicon {
                Some(lexicon) => self.load_postagger_with_lexicon(model, lexicon)?,
                None => self.load_postagger(model)?,
            }
            loaded.push(ResourceKind::Postagger);
        }
        if let Some(model) = &config.ner_model {
            self.load_recognizer(model)?;
            loaded.push(ResourceKind::Recognizer);
        }
        if let Some(model) = &config.parser_model {
            self.load_parser(model)?;
            loaded.push(ResourceKind::Parser);
        }
        if let Some(model) = &config.semantic_parser_model {
            self.load_semantic_parser(model)?;
            loaded.push(ResourceKind::SemanticParser);
        }
        if let Some(dir) = &config.lstm_semantic_parser_dir {
            self.load_lstm_semantic_parser(dir)?;
            loaded.push(ResourceKind::LstmSemanticParser);
        }
        if let Some(folder) = &config.srl_data_dir {
            self.load_srl(folder)?;
            loaded.push(ResourceKind::Srl);
        }

        info!("Loaded {} resources from configuration", loaded.len());
        Ok(loaded)
    }
}

impl<S: EngineSuite> Drop for ResourceManager<S> {
    fn drop(&mut self) {
        let failures = self.release_all();
        if !failures.is_empty() {
            error!("{} resources could not be released during teardown", failures.len());
        }
    }
}
