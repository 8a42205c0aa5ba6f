//! Capability traits the search engine is generic over.

pub mod independence_test;
pub mod observer;
pub mod score;

pub use independence_test::{IndependenceResult, IndependenceTest, LastPValue};
pub use observer::{NoopObserver, RecordingObserver, SearchEvent, SearchObserver, TracingObserver};
pub use score::Score;
