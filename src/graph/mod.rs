//! Graph construction, storage and persistence
//!
//! - [`builder`]: mutable adjacency builder with integer co-occurrence counts
//! - [`csr`]: immutable CSR form used by every algorithm
//! - [`cooccurrence`]: sentence / paragraph / page graph construction
//! - [`persist`]: binary and GraphML encodings

pub mod builder;
pub mod cooccurrence;
pub mod csr;
pub mod persist;

pub use builder::GraphBuilder;
pub use cooccurrence::{build_graphs, BuildReport, CooccurrenceGraphBuilder, GraphSet};
pub use csr::CsrGraph;
pub use persist::GraphFormat;
