//! Dual-mode entry point for host programs
//!
//! A host program calls [`setup`] once at startup. If the recognized
//! detach flag is present in the process's own arguments, this is a
//! control-mode invocation: the matching registry action runs and the
//! process exits immediately with a success status, errors going to
//! diagnostic output only. Otherwise this is a parent-mode invocation
//! and the host receives a [`CleanupGuard`] that removes the process's
//! own registry record when dropped.

use crate::controller::Controller;
use crate::registry::RegistryStore;
use crate::{DetachError, Result};
use std::str::FromStr;
use tracing::error;

/// Classification of the current invocation, decided purely from the
/// raw argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// No detach flag present: the host runs its own long-running work
    Parent,
    /// Detach flag present: perform one registry action and exit
    Control {
        /// Token following the flag, if any
        action: Option<String>,
        /// Remaining arguments in original order, flag and action
        /// tokens excluded — what a started child will run with
        clean_args: Vec<String>,
    },
}

/// The four recognized control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Status,
    Stop,
    Restart,
}

impl FromStr for Action {
    type Err = DetachError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Action::Start),
            "status" => Ok(Action::Status),
            "stop" => Ok(Action::Stop),
            "restart" => Ok(Action::Restart),
            "" => Err(DetachError::InvalidAction("no action given".to_string())),
            other => Err(DetachError::InvalidAction(other.to_string())),
        }
    }
}

/// A token matches the flag when it carries a leading dash prefix and
/// equals the flag name once all leading dashes are stripped; `-d` and
/// `--d` are not distinguished.
fn matches_flag(token: &str, flag: &str) -> bool {
    token.starts_with('-') && token.trim_start_matches('-') == flag
}

/// Classify an argument vector in a single pass.
///
/// The token immediately following each matched flag is consumed; the
/// first consumed token is the action. Matched flags and consumed tokens
/// are excluded from the clean args, every other token is kept in order.
pub fn classify(flag: &str, argv: &[String]) -> Invocation {
    let mut found = false;
    let mut consume_next = false;
    let mut action: Option<String> = None;
    let mut clean_args: Vec<String> = Vec::new();

    for token in argv {
        if matches_flag(token, flag) {
            found = true;
            consume_next = true;
            continue;
        }
        if consume_next {
            consume_next = false;
            if action.is_none() {
                action = Some(token.clone());
            }
            continue;
        }
        clean_args.push(token.clone());
    }

    if found {
        Invocation::Control { action, clean_args }
    } else {
        Invocation::Parent
    }
}

/// The argument a host registers on its own `clap` command so that help
/// output mentions the detach option. The launcher never reads the
/// parsed value; detection works on the raw argument vector.
pub fn clap_arg(flag: &str) -> clap::Arg {
    let arg = clap::Arg::new("detach_action")
        .value_name("ACTION")
        .help("start, status, stop or restart");
    if flag.chars().count() == 1 {
        arg.short(flag.chars().next().unwrap_or('d'))
    } else {
        arg.long(flag.to_string())
    }
}

/// Removes the current process's own registry record on drop.
///
/// Returned to parent-mode invocations; the host keeps it alive for the
/// duration of its long-running work so that a detached instance
/// deregisters itself on every orderly exit path. Deletion failure is
/// logged, never escalated.
#[derive(Debug)]
pub struct CleanupGuard {
    store: RegistryStore,
    pid: i32,
}

impl CleanupGuard {
    fn new(store: RegistryStore) -> Self {
        Self {
            store,
            pid: std::process::id() as i32,
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.store.delete_pid(self.pid) {
            error!("cleanup: failed to remove own registry record: {}", e);
        }
    }
}

/// Set up detachment against the machine-shared registry.
///
/// See [`setup_with`]; control-mode invocations never return.
pub fn setup(flag: &str) -> CleanupGuard {
    setup_with(flag, RegistryStore::shared())
}

/// Set up detachment against an explicit registry store.
///
/// In control mode this dispatches the requested action and then
/// terminates the process with a success exit status regardless of the
/// action's outcome; failures are reported to diagnostic output only.
/// In parent mode it returns the cleanup guard.
pub fn setup_with(flag: &str, store: RegistryStore) -> CleanupGuard {
    let argv: Vec<String> = std::env::args().collect();
    match classify(flag, &argv) {
        Invocation::Parent => CleanupGuard::new(store),
        Invocation::Control { action, clean_args } => {
            init_control_logging();
            let controller = Controller::new(store);
            if let Err(e) = dispatch(&controller, flag, action.as_deref(), &clean_args) {
                error!("detach action failed: {}", e);
            }
            std::process::exit(0);
        }
    }
}

fn dispatch(
    controller: &Controller,
    flag: &str,
    action: Option<&str>,
    clean_args: &[String],
) -> Result<()> {
    match action.unwrap_or("").parse::<Action>() {
        Ok(Action::Start) => controller.start(clean_args),
        Ok(Action::Status) => controller.status(),
        Ok(Action::Stop) => controller.stop(),
        Ok(Action::Restart) => controller.restart(clean_args),
        Err(e) => {
            print_usage(flag);
            Err(e)
        }
    }
}

/// Best-effort logger for control-mode invocations, which exit before
/// the host gets a chance to install its own subscriber.
fn init_control_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

fn print_usage(flag: &str) {
    let prog = std::env::args().next().unwrap_or_else(|| "program".to_string());
    let mut cmd = clap::Command::new(prog)
        .disable_help_flag(true)
        .arg(clap_arg(flag));
    eprintln!("{}", cmd.render_help());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProcessRecord;
    use chrono::Utc;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_without_flag_is_parent() {
        let inv = classify("d", &argv(&["myprog", "--port=9090"]));
        assert_eq!(inv, Invocation::Parent);
    }

    #[test]
    fn test_classify_single_dash_flag() {
        let inv = classify("d", &argv(&["myprog", "-d", "start", "--port=9090"]));
        assert_eq!(
            inv,
            Invocation::Control {
                action: Some("start".to_string()),
                clean_args: argv(&["myprog", "--port=9090"]),
            }
        );
    }

    #[test]
    fn test_classify_double_dash_flag() {
        let inv = classify("detach", &argv(&["myprog", "--detach", "stop"]));
        assert_eq!(
            inv,
            Invocation::Control {
                action: Some("stop".to_string()),
                clean_args: argv(&["myprog"]),
            }
        );
    }

    #[test]
    fn test_classify_missing_action() {
        let inv = classify("d", &argv(&["myprog", "-d"]));
        assert_eq!(
            inv,
            Invocation::Control {
                action: None,
                clean_args: argv(&["myprog"]),
            }
        );
    }

    #[test]
    fn test_classify_preserves_argument_order() {
        let inv = classify("d", &argv(&["myprog", "a", "-d", "restart", "b", "c"]));
        assert_eq!(
            inv,
            Invocation::Control {
                action: Some("restart".to_string()),
                clean_args: argv(&["myprog", "a", "b", "c"]),
            }
        );
    }

    #[test]
    fn test_bare_token_is_not_a_flag() {
        // "d" without a dash prefix must not trigger control mode
        let inv = classify("d", &argv(&["myprog", "d", "start"]));
        assert_eq!(inv, Invocation::Parent);
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("start".parse::<Action>().unwrap(), Action::Start);
        assert_eq!("status".parse::<Action>().unwrap(), Action::Status);
        assert_eq!("stop".parse::<Action>().unwrap(), Action::Stop);
        assert_eq!("restart".parse::<Action>().unwrap(), Action::Restart);
        assert!("reload".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_clap_arg_short_and_long() {
        assert_eq!(clap_arg("d").get_short(), Some('d'));
        assert_eq!(clap_arg("detach").get_long(), Some("detach"));
    }

    #[test]
    fn test_cleanup_guard_removes_own_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());

        let pid = std::process::id() as i32;
        store
            .write(&ProcessRecord {
                pid,
                args: vec!["myprog".to_string()],
                start_time: Utc::now(),
            })
            .unwrap();

        drop(CleanupGuard::new(store.clone()));
        assert!(store.enumerate().is_empty());
    }
}
