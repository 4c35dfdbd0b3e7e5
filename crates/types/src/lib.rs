pub mod geometry;

pub use geometry::{EPSILON, Rect, approx_eq, approx_le, union_all};
