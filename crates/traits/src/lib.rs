pub mod mutator;
pub mod oracle;
pub mod synthetic;

pub use mutator::DomMutator;
pub use oracle::{GeometryOracle, NodeType};
pub use synthetic::SyntheticTag;
