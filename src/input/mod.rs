//! Input handling types.
//!
//! This module defines the host-independent key, mode and event types the
//! annotator consumes. Hosts translate their native pointer and keyboard
//! events into these values.

pub mod events;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{InputEvent, Key};
pub use tool::Mode;
