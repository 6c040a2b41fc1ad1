//! Value store module
//!
//! Holds the values callbacks use to carry state across suspension points.

mod values;

pub use values::ValueStore;
