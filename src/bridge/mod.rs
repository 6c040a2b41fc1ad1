//! Result bridge module
//!
//! Adapts the coordinator's drive cycle to the iteration protocol: a fixed
//! run of step values followed by a terminal result.

mod result_bridge;

pub use result_bridge::{BridgeState, ResultBridge, ResultHandle};
