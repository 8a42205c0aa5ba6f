//! Comparing an estimated graph with a reference graph.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use causa_core::errors::GraphError;
use causa_core::graph::Endpoint;
use causa_core::{Edge, Graph, NodeId, SearchResult};

/// Label for a node pair with no edge.
const NO_EDGE: &str = "none";

/// Row and column order of the misclassification table.
const LABELS: [&str; 10] = ["---", "-->", "<--", "<->", "o-o", "o->", "<-o", "o--", "--o", NO_EDGE];

/// Counts of reference edge type against estimated edge type, with both
/// read in the reference graph's node order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeMisclassification {
    /// Reference type -> estimated type -> count.
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl EdgeMisclassification {
    fn record(&mut self, truth: &str, estimate: &str) {
        *self
            .counts
            .entry(truth.to_string())
            .or_default()
            .entry(estimate.to_string())
            .or_default() += 1;
    }

    /// Pairs whose reference edge reads `truth` and estimated edge reads
    /// `estimate`, e.g. `("-->", "o->")`. `"none"` stands for no edge.
    pub fn count(&self, truth: &str, estimate: &str) -> usize {
        self.counts
            .get(truth)
            .and_then(|row| row.get(estimate))
            .copied()
            .unwrap_or(0)
    }

    /// Pairs where the two graphs disagree.
    pub fn mismatches(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|(t, row)| row.iter().filter(move |(e, _)| *e != t).map(|(_, n)| n))
            .sum()
    }

    /// Plain-text table: rows are reference types, columns estimated types.
    /// Only types that occur are shown.
    pub fn to_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EdgeMisclassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<&str> = LABELS
            .iter()
            .copied()
            .filter(|l| self.counts.contains_key(*l))
            .collect();
        let cols: Vec<&str> = LABELS
            .iter()
            .copied()
            .filter(|l| self.counts.values().any(|row| row.contains_key(*l)))
            .collect();
        write!(f, "{:>6}", "")?;
        for c in &cols {
            write!(f, "{c:>6}")?;
        }
        writeln!(f)?;
        for r in &rows {
            write!(f, "{r:>6}")?;
            for c in &cols {
                write!(f, "{:>6}", self.count(r, c))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Adjacency, arrowhead, and structural Hamming distance statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphComparison {
    pub adjacency_tp: usize,
    pub adjacency_fp: usize,
    pub adjacency_fn: usize,
    pub arrowhead_tp: usize,
    pub arrowhead_fp: usize,
    pub arrowhead_fn: usize,
    /// One per missing or extra adjacency, one per shared adjacency whose
    /// marks differ.
    pub shd: usize,
    pub misclassification: EdgeMisclassification,
}

impl GraphComparison {
    /// NaN when the estimate has no edges.
    pub fn adjacency_precision(&self) -> f64 {
        ratio(self.adjacency_tp, self.adjacency_tp + self.adjacency_fp)
    }

    /// NaN when the reference has no edges.
    pub fn adjacency_recall(&self) -> f64 {
        ratio(self.adjacency_tp, self.adjacency_tp + self.adjacency_fn)
    }

    pub fn arrowhead_precision(&self) -> f64 {
        ratio(self.arrowhead_tp, self.arrowhead_tp + self.arrowhead_fp)
    }

    pub fn arrowhead_recall(&self) -> f64 {
        ratio(self.arrowhead_tp, self.arrowhead_tp + self.arrowhead_fn)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        f64::NAN
    } else {
        num as f64 / den as f64
    }
}

/// Compare `estimate` against `truth`. Both graphs must be over the same
/// node names; node order may differ.
pub fn compare_graphs(truth: &Graph, estimate: &Graph) -> SearchResult<GraphComparison> {
    if truth.node_count() != estimate.node_count() {
        return Err(GraphError::NodeSetMismatch {
            details: format!(
                "node sets differ: {} vs {} nodes",
                truth.node_count(),
                estimate.node_count()
            ),
        }
        .into());
    }
    let to_estimate: Vec<NodeId> = truth
        .nodes()
        .iter()
        .map(|n| estimate.require_node(n.name()))
        .collect::<Result<_, _>>()?;

    let mut cmp = GraphComparison::default();
    for i in truth.node_ids() {
        for j in (i + 1)..truth.node_count() {
            let (ei, ej) = (to_estimate[i], to_estimate[j]);
            let t = truth.edge(i, j);
            let e = estimate
                .edge(ei, ej)
                .map(|e| Edge::new(i, j, e.endpoint1, e.endpoint2));

            match (t.is_some(), e.is_some()) {
                (true, true) => cmp.adjacency_tp += 1,
                (false, true) => cmp.adjacency_fp += 1,
                (true, false) => cmp.adjacency_fn += 1,
                (false, false) => continue,
            }

            for node in [i, j] {
                let arrow_t = t.and_then(|t| t.endpoint_at(node)) == Some(Endpoint::Arrow);
                let arrow_e = e.and_then(|e| e.endpoint_at(node)) == Some(Endpoint::Arrow);
                match (arrow_t, arrow_e) {
                    (true, true) => cmp.arrowhead_tp += 1,
                    (false, true) => cmp.arrowhead_fp += 1,
                    (true, false) => cmp.arrowhead_fn += 1,
                    (false, false) => {}
                }
            }

            let label = |edge: Option<Edge>| edge.map_or_else(|| NO_EDGE.to_string(), |e| e.connector());
            let (lt, le) = (label(t), label(e));
            if lt != le {
                cmp.shd += 1;
            }
            cmp.misclassification.record(&lt, &le);
        }
    }
    Ok(cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::graph::nodes_from_names;

    fn graph(names: &[&str]) -> Graph {
        Graph::with_nodes(nodes_from_names(names)).unwrap()
    }

    #[test]
    fn identical_graphs_are_perfect() {
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_undirected_edge(1, 2).unwrap();
        let cmp = compare_graphs(&g, &g).unwrap();
        assert_eq!(cmp.shd, 0);
        assert_eq!(cmp.adjacency_precision(), 1.0);
        assert_eq!(cmp.arrowhead_recall(), 1.0);
        assert_eq!(cmp.misclassification.mismatches(), 0);
    }

    #[test]
    fn reversed_and_missing_edges() {
        let mut truth = graph(&["A", "B", "C"]);
        truth.add_directed_edge(0, 1).unwrap();
        truth.add_directed_edge(1, 2).unwrap();
        let mut est = graph(&["A", "B", "C"]);
        est.add_directed_edge(1, 0).unwrap();
        let cmp = compare_graphs(&truth, &est).unwrap();
        assert_eq!((cmp.adjacency_tp, cmp.adjacency_fn, cmp.adjacency_fp), (1, 1, 0));
        assert_eq!((cmp.arrowhead_tp, cmp.arrowhead_fp, cmp.arrowhead_fn), (0, 1, 2));
        assert_eq!(cmp.shd, 2);
        assert_eq!(cmp.misclassification.count("-->", "<--"), 1);
        assert_eq!(cmp.misclassification.count("-->", "none"), 1);
        assert!(cmp.misclassification.to_table().contains("<--"));
    }

    #[test]
    fn table_has_aligned_columns() {
        let mut truth = graph(&["A", "B", "C"]);
        truth.add_directed_edge(0, 1).unwrap();
        truth.add_bidirected_edge(1, 2).unwrap();
        let mut est = graph(&["A", "B", "C"]);
        est.add_directed_edge(0, 1).unwrap();
        let m = compare_graphs(&truth, &est).unwrap().misclassification;
        let table = m.to_string();
        assert_eq!(table, m.to_table());
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| l.len() == lines[0].len() && l.len() % 6 == 0));
        assert!(lines[1..].iter().any(|l| l.starts_with("   -->")));
        assert!(lines[1..].iter().any(|l| l.starts_with("   <->")));
    }

    #[test]
    fn node_order_does_not_matter() {
        let mut truth = graph(&["A", "B"]);
        truth.add_directed_edge(0, 1).unwrap();
        let mut est = graph(&["B", "A"]);
        est.add_directed_edge(1, 0).unwrap();
        assert_eq!(compare_graphs(&truth, &est).unwrap().shd, 0);
    }

    #[test]
    fn empty_estimate_has_undefined_precision() {
        let mut truth = graph(&["A", "B"]);
        truth.add_directed_edge(0, 1).unwrap();
        let cmp = compare_graphs(&truth, &graph(&["A", "B"])).unwrap();
        assert!(cmp.adjacency_precision().is_nan());
        assert_eq!(cmp.adjacency_recall(), 0.0);
    }

    #[test]
    fn unknown_node_is_an_error() {
        assert!(compare_graphs(&graph(&["A"]), &graph(&["Z"])).is_err());
    }
}
