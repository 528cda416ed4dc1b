//! OS process primitives for detachment
//!
//! Platform-specific spawn and signal helpers. Only Unix is supported:
//! detachment relies on `setsid()` to disassociate the child from the
//! parent's session and controlling terminal.

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::{signal_kill, spawn_detached, DetachedChild};
