//! Resource configuration.
//!
//! A JSON document naming the locator of every resource to load and the
//! shared library that provides each engine. Every locator is optional;
//! slots without one are left absent.
//!
//! ```json
//! {
//!   "segmentor_model": "ltp_data/cws.model",
//!   "postagger_model": "ltp_data/pos.model",
//!   "srl_data_dir": "ltp_data/srl",
//!   "libraries": { "segmentor": "/opt/ltp/lib/libsegmentor.so" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    pub segmentor_model: Option<PathBuf>,
    pub segmentor_lexicon: Option<PathBuf>,
    pub postagger_model: Option<PathBuf>,
    pub postagger_lexicon: Option<PathBuf>,
    pub ner_model: Option<PathBuf>,
    pub parser_model: Option<PathBuf>,
    pub semantic_parser_model: Option<PathBuf>,
    pub lstm_semantic_parser_dir: Option<PathBuf>,
    pub srl_data_dir: Option<PathBuf>,
    pub libraries: EngineLibraries,
}

impl ResourceConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid config in {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse resource config")
    }
}

/// Shared libraries implementing each engine.
///
/// Defaults to the platform file name of the library in the loader's
/// search path, e.g. `libsegmentor.so` on Linux. The dependency parser and
/// the first semantic parser share one library.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineLibraries {
    pub segmentor: PathBuf,
    pub postagger: PathBuf,
    pub ner: PathBuf,
    pub parser: PathBuf,
    pub lstm_semantic_parser: PathBuf,
    pub srl: PathBuf,
}

impl Default for EngineLibraries {
    fn default() -> Self {
        Self {
            segmentor: library_file("segmentor"),
            postagger: library_file("postagger"),
            ner: library_file("ner"),
            parser: library_file("parser"),
            lstm_semantic_parser: library_file("lstmsdparser"),
            srl: library_file("srl"),
        }
    }
}

fn library_file(name: &str) -> PathBuf {
    PathBuf::from(libloading::library_filename(name))
}
