//! Splitters for nodes whose break units are not plain children.
//!
//! Each one returns the ordered break units of a node, or an empty list when
//! the node should move as a whole.

mod grid;
mod pre;
mod table;
