//! Testing utilities for record graph assertions
//!
//!     Asserting on a parsed graph by hand means a lot of `records["A"].fields("UNION")[0]`
//!     indexing, and a failing index panics without saying which record or field was
//!     being looked at. [assert_graph](fn@assert_graph) walks the result with a fluent API
//!     and every failure message carries the path that led to it:
//!
//!     ```rust,ignore
//!     use ftt::ftt::testing::{assert_graph, TextMatch};
//!
//!     assert_graph(&parse(source))
//!         .is_valid()
//!         .record("B", |b| {
//!             b.field_count("UNION", 1).field("UNION", 0, |union| {
//!                 union.is_implicit().slot(0, "A");
//!             });
//!         });
//!     ```

mod graph_assertions;
mod matchers;

pub use graph_assertions::{assert_graph, FieldAssertion, GraphAssertion, RecordAssertion};
pub use matchers::TextMatch;
