//! Side effects the daemon performs on the user's desktop

use focus_config::Script;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Application name shown on desktop notifications
pub const NOTIFICATION_APP_NAME: &str = "focusd";

/// Desktop actions triggered by timer hooks
///
/// Both operations are fire-and-forget: they must return immediately and
/// never block the event loop.
pub trait HostActions: Send + Sync {
    /// Show a desktop notification
    fn notify(&self, message: &str);

    /// Run a user script
    fn run_script(&self, script: &Script);
}

/// Runs `notify-send` and user scripts as child processes
#[derive(Debug, Default)]
pub struct ProcessActions;

impl ProcessActions {
    pub fn new() -> Self {
        Self
    }

    fn spawn(&self, label: String, argv: Vec<String>) {
        let Some((program, args)) = argv.split_first() else {
            warn!(label = %label, "Refusing to spawn empty command");
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(label = %label, "No async runtime available, command not run");
            return;
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        runtime.spawn(async move {
            match cmd.status().await {
                Ok(status) if status.success() => {
                    debug!(label = %label, "Command finished");
                }
                Ok(status) => {
                    warn!(label = %label, code = ?status.code(), "Command exited with failure");
                }
                Err(e) => {
                    warn!(label = %label, error = %e, "Failed to run command");
                }
            }
        });
    }
}

impl HostActions for ProcessActions {
    fn notify(&self, message: &str) {
        debug!(message = %message, "Sending notification");
        self.spawn(
            "notify-send".into(),
            vec![
                "notify-send".into(),
                "--app-name".into(),
                NOTIFICATION_APP_NAME.into(),
                NOTIFICATION_APP_NAME.into(),
                message.into(),
            ],
        );
    }

    fn run_script(&self, script: &Script) {
        debug!(script = %script.name, argv = ?script.argv, "Running script");
        self.spawn(format!("script {}", script.name), script.argv.clone());
    }
}
