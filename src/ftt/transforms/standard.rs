//! Standard transform definitions
//!
//! Pipelines for the default configuration are built once and shared as statics.

use crate::ftt::config::ParserConfig;
use crate::ftt::session::Session;
use crate::ftt::transforms::stages::{GraphValidation, LineProcessing, PostProcessing};
use crate::ftt::transforms::Transform;
use once_cell::sync::Lazy;

/// Source text to a validated record graph.
pub type GraphTransform = Transform<String, Session>;

/// Line processing only: no implicit fields, no validation.
pub static LINE_PROCESSING: Lazy<GraphTransform> = Lazy::new(|| {
    Transform::from_fn(Ok).then(LineProcessing::new(ParserConfig::default()))
});

/// Full pipeline with the default configuration.
pub static STRING_TO_GRAPH: Lazy<GraphTransform> =
    Lazy::new(|| graph_pipeline(&ParserConfig::default()));

/// Full pipeline for a given configuration.
pub fn graph_pipeline(config: &ParserConfig) -> GraphTransform {
    Transform::from_fn(Ok)
        .then(LineProcessing::new(config.clone()))
        .then(PostProcessing::new())
        .then(GraphValidation::new(config.clone()))
}
