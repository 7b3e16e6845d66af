//! Surge detection engine.
//!
//! Holds the tracking state shared between the poller and the chat
//! handlers, and the pure threshold checks that turn observations into
//! alerts.

pub mod accounts;
pub mod backoff;
pub mod detector;
pub mod registry;
pub mod thresholds;

pub use accounts::*;
pub use backoff::*;
pub use detector::*;
pub use registry::*;
pub use thresholds::*;
