use causa_core::errors::*;

#[test]
fn config_error_invalid_depth_carries_value() {
    let err = ConfigError::InvalidDepth { depth: -7 };
    assert!(err.to_string().contains("-7"));
}

#[test]
fn graph_error_not_adjacent_carries_names() {
    let err = GraphError::NotAdjacent {
        a: "X1".into(),
        b: "X2".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("X1"));
    assert!(msg.contains("X2"));
}

#[test]
fn knowledge_conflict_carries_edge() {
    let err = KnowledgeError::Conflict {
        from: "A".into(),
        to: "B".into(),
    };
    assert!(err.to_string().contains("A --> B"));
}

#[test]
fn degenerate_error_carries_dimension() {
    let err = DegenerateTestError::SingularMatrix { dimension: 4 };
    assert!(err.to_string().contains('4'));
}

// --- From impls ---

#[test]
fn config_error_converts_to_search_error() {
    let err: SearchError = ConfigError::ZeroThreads.into();
    assert!(matches!(err, SearchError::Config(_)));
}

#[test]
fn graph_error_converts_to_search_error() {
    let err: SearchError = GraphError::UnknownNode("Q".into()).into();
    assert!(matches!(err, SearchError::Graph(_)));
}

#[test]
fn knowledge_error_converts_to_search_error() {
    let err: SearchError = KnowledgeError::SelfReference("A".into()).into();
    assert!(matches!(err, SearchError::Knowledge(_)));
}

#[test]
fn data_error_converts_to_search_error() {
    let err: SearchError = DataError::Empty.into();
    assert!(matches!(err, SearchError::Data(_)));
}

#[test]
fn question_mark_propagates_through_search_result() {
    fn inner() -> SearchResult<()> {
        Err(GraphError::SelfLoop("A".into()))?;
        Ok(())
    }
    assert!(matches!(inner(), Err(SearchError::Graph(GraphError::SelfLoop(_)))));
}
