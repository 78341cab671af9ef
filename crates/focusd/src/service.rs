//! The focusd service: owns the engine and runs the event loop

use anyhow::{Context, Result};
use focus_api::{Command, QueueCommand, Visibility};
use focus_config::{Config, load_config};
use focus_core::{ClockSource, SystemClock, TickIntervals, TimerEngine};
use focus_host_api::TimerHooks;
use focus_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use focus_util::{format_countdown, format_datetime_full, format_duration};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

use crate::actions::{HostActions, ProcessActions};
use crate::driver::TickDriver;
use crate::hooks::DaemonHooks;

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "focusd.db";

/// Startup options resolved from the command line
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub config_path: PathBuf,
    /// Overrides `daemon.data_dir` from the config file
    pub data_dir: Option<PathBuf>,
    /// Start with the host hidden regardless of the config
    pub start_hidden: bool,
}

/// What the event loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    Quit,
}

pub struct Service {
    engine: TimerEngine,
    hooks: Arc<DaemonHooks>,
    store: Arc<dyn Store>,
    config_path: PathBuf,
    config: Config,
}

impl Service {
    pub fn new(options: ServiceOptions) -> Result<Self> {
        let mut config = if options.config_path.exists() {
            load_config(&options.config_path).with_context(|| {
                format!("Failed to load config from {:?}", options.config_path)
            })?
        } else {
            info!(
                config_path = %options.config_path.display(),
                "No config file found, using defaults"
            );
            Config::default()
        };

        if let Some(data_dir) = &options.data_dir {
            config.daemon.data_dir = data_dir.clone();
        }
        if options.start_hidden {
            config.daemon.start_hidden = true;
        }

        let data_dir = config.daemon.data_dir.clone();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DATABASE_FILE);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        Self::with_parts(
            config,
            options.config_path,
            store,
            Arc::new(ProcessActions::new()),
            Arc::new(SystemClock),
        )
    }

    /// Assemble a service from already-built parts
    pub fn with_parts(
        config: Config,
        config_path: PathBuf,
        store: Arc<dyn Store>,
        actions: Arc<dyn HostActions>,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self> {
        let hooks = Arc::new(DaemonHooks::new(store.clone(), actions, config.clone()));
        let visibility = if config.daemon.start_hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };

        let engine_hooks: Arc<dyn TimerHooks> = hooks.clone();
        let engine = TimerEngine::new(config.timer.clone(), engine_hooks, clock)
            .context("Invalid timer configuration")?
            .with_tick_intervals(TickIntervals {
                frame: config.daemon.frame_interval,
                fallback: config.daemon.fallback_interval,
            })
            .with_visibility(visibility);

        store.append_audit(AuditEvent::new(AuditEventType::DaemonStarted))?;

        Ok(Self {
            engine,
            hooks,
            store,
            config_path,
            config,
        })
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply one command to the engine
    pub fn handle_command(&mut self, command: Command) -> CommandOutcome {
        debug!(command = ?command, "Handling command");

        let reply = match command {
            Command::Start => {
                self.engine.start();
                self.status_line()
            }
            Command::Pause => {
                self.engine.pause();
                self.status_line()
            }
            Command::Toggle => {
                self.engine.toggle();
                self.status_line()
            }
            Command::Skip => {
                self.engine.skip(true);
                self.status_line()
            }
            Command::Restart => {
                self.engine.restart();
                self.status_line()
            }
            Command::Status => self.status(),
            Command::SetVisibility(visibility) => {
                self.hooks.set_visibility(visibility);
                self.engine.set_visibility(visibility);
                match visibility {
                    Visibility::Visible => "visible".to_string(),
                    Visibility::Hidden => "hidden".to_string(),
                }
            }
            Command::Reload => self.reload(),
            Command::Queue(op) => self.handle_queue(op),
            Command::History { limit } => self.history(limit),
            Command::Quit => return CommandOutcome::Quit,
        };

        CommandOutcome::Reply(reply)
    }

    fn status_line(&self) -> String {
        let state = self.engine.state();
        format!(
            "{} {} {}",
            state.session_type.label(),
            if state.is_playing { "running" } else { "paused" },
            format_countdown(state.remaining())
        )
    }

    fn status(&self) -> String {
        let state = self.engine.state();
        let mut out = self.status_line();
        let _ = write!(
            out,
            "\ncompleted focus sessions: {}\nlong break every: {}",
            state.iteration, self.engine.config().long_break_interval
        );

        match self.store.focus_time_on(focus_util::now().date_naive()) {
            Ok(total) => {
                let _ = write!(out, "\nfocused today: {}", format_duration(total));
            }
            Err(e) => warn!(error = %e, "Failed to read today's focus time"),
        }

        if !self.engine.queue().is_empty() {
            let _ = write!(out, "\nqueued: {}", self.engine.queue().len());
        }
        out
    }

    fn reload(&mut self) -> String {
        let result = load_config(&self.config_path)
            .map_err(anyhow::Error::from)
            .and_then(|config| {
                self.hooks.set_config(config.clone())?;
                if let Err(e) = self.engine.update_config(config.timer.clone()) {
                    self.hooks.set_config(self.config.clone())?;
                    return Err(e.into());
                }
                Ok(config)
            });

        let success = result.is_ok();
        if let Err(e) = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ConfigReloaded { success }))
        {
            warn!(error = %e, "Failed to log config reload");
        }

        match result {
            Ok(config) => {
                info!(config_path = %self.config_path.display(), "Configuration reloaded");
                self.config = config;
                "config reloaded".to_string()
            }
            Err(e) => {
                warn!(error = %e, "Config reload rejected, keeping current config");
                format!("error: {:#}", e)
            }
        }
    }

    fn handle_queue(&mut self, op: QueueCommand) -> String {
        let result = match op {
            QueueCommand::List => return self.queue_listing(),
            QueueCommand::Add {
                duration,
                iterations,
            } => self.engine.enqueue(duration, iterations),
            QueueCommand::Remove { index } => self.engine.remove_queued(index).map(|_| ()),
            QueueCommand::Swap { index, target } => self.engine.swap_queued(index, target),
            QueueCommand::Increment { index } => {
                self.engine.increment_queued_iterations(index).map(|_| ())
            }
            QueueCommand::Decrement { index } => {
                self.engine.decrement_queued_iterations(index).map(|_| ())
            }
            QueueCommand::SetDuration { index, duration } => {
                self.engine.set_queued_duration(index, duration)
            }
            QueueCommand::Clear => {
                self.engine.clear_queue();
                Ok(())
            }
        };

        match result {
            Ok(()) => self.queue_listing(),
            Err(e) => format!("error: {}", e),
        }
    }

    fn queue_listing(&self) -> String {
        let queue = self.engine.queue();
        if queue.is_empty() {
            return "queue empty".to_string();
        }

        queue
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                format!(
                    "{}: {} x{}",
                    index,
                    format_duration(entry.duration),
                    entry.iterations
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn history(&self, limit: usize) -> String {
        let sessions = match self.store.recent_sessions(limit) {
            Ok(sessions) => sessions,
            Err(e) => return format!("error: {}", e),
        };
        if sessions.is_empty() {
            return "no sessions recorded".to_string();
        }

        sessions
            .iter()
            .map(|record| {
                format!(
                    "{} {} {}",
                    format_datetime_full(&record.started_at),
                    format_duration(record.elapsed),
                    record.reason.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run the event loop until a signal or `quit`
    pub async fn run(mut self) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut driver = TickDriver::new();
        driver.sync(self.engine.tick_schedule());

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) if line.trim().is_empty() => {}
                        Ok(Some(line)) => match line.parse::<Command>() {
                            Ok(command) => match self.handle_command(command) {
                                CommandOutcome::Reply(reply) => println!("{}", reply),
                                CommandOutcome::Quit => break,
                            },
                            Err(e) => println!("error: {}", e),
                        },
                        Ok(None) => {
                            debug!("Command input closed");
                            stdin_open = false;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read command input");
                            stdin_open = false;
                        }
                    }
                }

                token = driver.tick() => {
                    self.engine.on_tick(token);
                }
            }

            driver.sync(self.engine.tick_schedule());
        }

        info!("Shutting down focusd");
        self.engine.shutdown();
        driver.sync(None);

        if let Err(e) = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::DaemonStopped))
        {
            warn!(error = %e, "Failed to log daemon shutdown");
        }

        info!("Shutdown complete");
        Ok(())
    }
}
