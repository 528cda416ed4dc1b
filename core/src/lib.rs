//! Self-detaching process launcher with a pid-file registry
//!
//! Turns a foreground command-line program into a self-managed detached
//! process and exposes start/status/stop/restart control over the set of
//! currently-detached instances. State lives in a shared directory of
//! pid files; there is no central daemon.
//!
//! A host program calls [`launcher::setup`] once at startup:
//!
//! ```rust,no_run
//! let _cleanup = detach_core::launcher::setup("d");
//! // long-running work; the guard deregisters this process on exit
//! ```

pub mod error;
pub mod record;
pub mod registry;

#[cfg(unix)]
pub mod controller;
#[cfg(unix)]
pub mod launcher;
#[cfg(unix)]
pub mod process;

pub use error::{DetachError, Result};
pub use record::{ProcessRecord, PID_FILE_SUFFIX};
pub use registry::RegistryStore;

#[cfg(unix)]
pub use controller::Controller;
#[cfg(unix)]
pub use launcher::{classify, clap_arg, setup, setup_with, Action, CleanupGuard, Invocation};
