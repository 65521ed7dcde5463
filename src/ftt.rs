//! Main module for ftt library functionality
//!
//!     Source text flows through the modules in this order:
//!
//!         lexing -> building -> assembling -> validation
//!
//!     tied together by the stages in [transforms] and exposed through [parsing] and
//!     [loader]. [ast] holds the output graph, [diagnostics] the error model, [schema]
//!     the per-key slot conventions shared by the later passes.

pub mod assembling;
pub mod ast;
pub mod building;
pub mod config;
pub mod dates;
pub mod diagnostics;
pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod places;
pub mod schema;
pub mod session;
pub mod testing;
pub mod transforms;
pub mod validation;
