//! Span resolution and run reconstruction

pub mod reconstructor;
pub mod resolver;

pub use reconstructor::{build_runs, reconstruct, validate_spans};
pub use resolver::{SpanLayout, SpanResolver};
