//! Graph utilities: equivalence classes, PAG legality, and comparison.

mod compare;
mod cpdag;
mod pag;

pub use compare::{compare_graphs, EdgeMisclassification, GraphComparison};
pub use cpdag::{cpdag_for_dag, dag_from_cpdag};
pub use pag::{guarantee_pag, is_legal_mag, is_legal_pag, pag_to_mag};
