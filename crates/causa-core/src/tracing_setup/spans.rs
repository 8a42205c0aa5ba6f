//! Span definitions per operation: search, adjacency search, orientation.
//!
//! Each span carries its parameters as fields via the `tracing` crate.

/// Create a top-level search span.
#[macro_export]
macro_rules! search_span {
    ($algorithm:expr, $variables:expr) => {
        tracing::info_span!("causa.search", algorithm = %$algorithm, variables = $variables)
    };
}

/// Create an adjacency-search span.
#[macro_export]
macro_rules! fas_span {
    ($variant:expr, $depth:expr) => {
        tracing::debug_span!("causa.fas", variant = %$variant, depth = $depth)
    };
}

/// Create an orientation span.
#[macro_export]
macro_rules! orient_span {
    ($engine:expr) => {
        tracing::debug_span!("causa.orient", engine = %$engine)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH: &str = "causa.search";
    pub const FAS: &str = "causa.fas";
    pub const ORIENT: &str = "causa.orient";
}
