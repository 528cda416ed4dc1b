//! Example host program
//!
//! Run `detach-demo -d start` to launch a detached instance,
//! `-d status` / `-d stop` / `-d restart` to manage the running set.
//! Without the flag it runs its dummy workload in the foreground.

use std::time::Duration;
use tracing::info;

fn main() {
    // Control-mode invocations never get past this call.
    let _cleanup = detach_core::setup("d");

    // Parent mode: register the detach option so --help stays coherent;
    // the launcher itself works off the raw argument vector.
    let _matches = clap::Command::new("detach-demo")
        .about("Dummy long-running workload with detach support")
        .arg(detach_core::clap_arg("d"))
        .get_matches();

    tracing_subscriber::fmt::init();
    info!("workload starting (pid {})", std::process::id());

    // Stand-in for real long-running work
    for i in 0..60 {
        std::thread::sleep(Duration::from_secs(1));
        info!("tick {}", i);
    }

    info!("workload finished");
    // _cleanup drops here and removes this process's registry record
}
