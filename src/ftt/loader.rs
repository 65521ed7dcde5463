//! Document loading utilities
//!
//! `DocumentLoader` reads source text from a file or a string and runs a pipeline over
//! it. The CLI and the integration tests both go through it.
//!
//! ```rust,ignore
//! use ftt::ftt::loader::DocumentLoader;
//!
//! let result = DocumentLoader::from_path("family.ftt")?.parse();
//! let session = DocumentLoader::from_string("HEAD_FORMAT: FTT v0.1\n").with(&LINE_PROCESSING)?;
//! ```

use crate::ftt::config::ParserConfig;
use crate::ftt::parsing::{self, ParseResult};
use crate::ftt::session::Abort;
use crate::ftt::transforms::standard::STRING_TO_GRAPH;
use crate::ftt::transforms::Transform;
use std::fs;
use std::path::Path;

/// Error that can occur when loading documents
#[derive(Debug, Clone)]
pub enum LoaderError {
    /// IO error when reading file
    IoError(String),
    /// A pipeline stage raised a fatal diagnostic
    Aborted(Abort),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::IoError(msg) => write!(f, "IO error: {}", msg),
            LoaderError::Aborted(abort) => write!(f, "Parse aborted: {}", abort),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::IoError(err.to_string())
    }
}

impl From<Abort> for LoaderError {
    fn from(abort: Abort) -> Self {
        LoaderError::Aborted(abort)
    }
}

/// Source text plus pipeline shortcuts.
pub struct DocumentLoader {
    source: String,
}

impl DocumentLoader {
    /// Load from a file path. A leading byte order mark is dropped later by the line source.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|err| LoaderError::IoError(format!("{}: {}", path.display(), err)))?;
        Ok(DocumentLoader { source })
    }

    pub fn from_string<S: Into<String>>(source: S) -> Self {
        DocumentLoader {
            source: source.into(),
        }
    }

    /// Run a custom transform on the source
    pub fn with<O: 'static>(&self, transform: &Transform<String, O>) -> Result<O, LoaderError> {
        Ok(transform.run(self.source.clone())?)
    }

    /// Full parse with the default configuration.
    pub fn parse(&self) -> ParseResult {
        parsing::run(&STRING_TO_GRAPH, &self.source)
    }

    pub fn parse_with(&self, config: &ParserConfig) -> ParseResult {
        parsing::parse_with(&self.source, config)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
