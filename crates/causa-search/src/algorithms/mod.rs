//! End-to-end searches: PC family, FCI, GFCI, and their building blocks.

mod fci;
mod gfci;
mod greedy;
mod pc;
mod possible_dsep;
mod sepset_finder;

use causa_core::{Graph, SearchResult, SepsetMap};

pub use fci::Fci;
pub use gfci::GFci;
pub use greedy::{GreedyDagSearch, InitialGraphSearch};
pub use pc::{Pc, PcVariant};
pub use possible_dsep::{possible_dsep, remove_by_possible_dsep};
pub use sepset_finder::{SepsetFinder, SepsetProducer};

/// A configured search that produces an equivalence-class graph.
pub trait GraphSearch: Send {
    fn search(&mut self) -> SearchResult<Graph>;

    /// Registry key of the algorithm.
    fn name(&self) -> &'static str;

    /// Sepsets recorded by the last search, if the algorithm keeps them.
    fn sepsets(&self) -> Option<&SepsetMap> {
        None
    }
}
