#![deny(missing_docs)]

//! # Type Graph Passes
//!
//! - **resolver**: `$ref` lookup with sentinel fallback.
//! - **flatten**: `allOf` merging into plain objects.
//! - **cycles**: back-edge detection over the flattened table.
//! - **sealed**: `oneOf` / `anyOf` alternatives and the parent registry.

pub mod cycles;
pub mod flatten;
pub mod resolver;
pub mod sealed;

pub use cycles::{detect_cycles, find_back_edges, BackEdge, CycleReport};
pub use flatten::flatten_all_of;
pub use resolver::{ref_name, Resolved, Resolver, Target, UNKNOWN_SCHEMA};
pub use sealed::{
    build_composition, discover, AlternativeMetadata, CompositionAlternative,
    CompositionMetadata, Discovery, DiscriminatorMetadata, DiscriminatorTarget, SealedRegistry,
};
