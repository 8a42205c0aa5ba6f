//! # causa-search
//!
//! The structure-search engine. Fast adjacency search builds a skeleton and a
//! sepset map; orientation engines (sepset colliders, conservative colliders,
//! Meek rules, FCI rules) turn it into a CPDAG or PAG.

pub mod algorithms;
pub mod fas;
pub mod orient;
pub mod registry;
pub mod utils;

pub use algorithms::{
    Fci, GFci, GraphSearch, GreedyDagSearch, InitialGraphSearch, Pc, PcVariant, SepsetFinder,
    SepsetProducer,
};
pub use fas::{AdjacencySearch, AdjacencySearchResult, Fas, FasConcurrent, FasStable};
pub use orient::{ConflictPolicy, FciOrient, MeekRules, TripleClassification};
pub use registry::{all_algorithms, build_search, build_search_for_data, lookup, AlgorithmEntry, SearchInputs};
