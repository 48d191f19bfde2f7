//! Console Event Sink
//!
//! Human-readable progress lines on stderr. Verbosity decides how much is
//! shown: failures and commands always, every file and directory at `-v`,
//! captured command output at `-vv`.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::Stylize;

use crate::domain::entities::{StepKind, StepResult};
use crate::domain::ports::{DeployEvent, DeployEventSink, Stage};
use crate::ui::primitives::icon::Icon;
use crate::ui::terminal::TerminalCapabilities;

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    caps: TerminalCapabilities,
    verbose: u8,
}

impl ConsoleEventSink {
    pub fn stderr(caps: TerminalCapabilities, verbose: u8) -> Self {
        Self::with_writer(io::stderr(), caps, verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(
        writer: W,
        caps: TerminalCapabilities,
        verbose: u8,
    ) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            caps,
            verbose,
        }
    }

    fn icon(&self, icon: Icon) -> String {
        icon.colored(self.caps.supports_color, self.caps.supports_unicode)
    }

    fn dim(&self, text: &str) -> String {
        if self.caps.supports_color {
            format!("{}", text.dark_grey())
        } else {
            text.to_string()
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
            let _ = writer.flush();
        }
    }

    fn render(&self, event: &DeployEvent) -> Vec<String> {
        match event {
            DeployEvent::Connecting { target } => {
                vec![format!("{} Connecting to {}", self.icon(Icon::Remote), target)]
            }
            DeployEvent::Connected { .. } => {
                vec![format!("{} Connected", self.icon(Icon::Success))]
            }
            DeployEvent::ConnectionFailed { error, .. } => {
                vec![format!("{} Connection failed: {}", self.icon(Icon::Error), error)]
            }
            DeployEvent::SyncStarted { local, remote } => vec![format!(
                "{} Syncing {} {} {}",
                self.icon(Icon::Progress),
                local.display(),
                self.icon(Icon::Arrow),
                remote
            )],
            DeployEvent::StageStarted { stage, count } => match stage {
                Stage::Sync | Stage::Commands => Vec::new(),
                _ => vec![format!(
                    "{} {} ({})",
                    self.icon(Icon::Progress),
                    stage_title(*stage),
                    count
                )],
            },
            DeployEvent::BatchStarted { name, commands } => vec![format!(
                "{} Batch {} ({} command{})",
                self.icon(Icon::Progress),
                name,
                commands,
                if *commands == 1 { "" } else { "s" }
            )],
            DeployEvent::CommandStarted { command } => {
                if self.verbose > 0 {
                    vec![format!("  {} {}", self.icon(Icon::Command), command)]
                } else {
                    Vec::new()
                }
            }
            DeployEvent::StepRecorded { step, .. } => self.render_step(step),
            DeployEvent::Cancelled => {
                vec![format!("{} Cancelled", self.icon(Icon::Warning))]
            }
            DeployEvent::Disconnected { target } => {
                if self.verbose > 0 {
                    vec![self.dim(&format!("  disconnected from {}", target))]
                } else {
                    Vec::new()
                }
            }
            DeployEvent::Completed { .. } => Vec::new(),
        }
    }

    fn render_step(&self, step: &StepResult) -> Vec<String> {
        let show = step.is_failure() || step.kind.is_command() || self.verbose > 0;
        if !show {
            return Vec::new();
        }

        let mut lines = vec![format!(
            "  {} {}",
            self.icon(Icon::for_step(step.kind)),
            step_label(step)
        )];
        if let Some(error) = &step.error {
            lines.push(format!("      {}", error));
        }
        if step.kind.is_command() && (self.verbose > 1 || step.kind == StepKind::CommandFailed) {
            for text in [&step.stdout, &step.stderr] {
                lines.extend(
                    text.lines()
                        .filter(|line| !line.trim().is_empty())
                        .map(|line| self.dim(&format!("      | {}", line))),
                );
            }
        }
        lines
    }
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Sync => "Sync",
        Stage::EnsureDirs => "Creating directories",
        Stage::Artifacts => "Writing artifacts",
        Stage::Removals => "Removing obsolete files",
        Stage::Commands => "Commands",
    }
}

fn step_label(step: &StepResult) -> String {
    match step.kind {
        StepKind::DirSkippedExists => format!("{} (exists)", step.target),
        StepKind::FileWritten => match step.bytes {
            Some(bytes) => format!("{} ({} bytes)", step.target, bytes),
            None => step.target.clone(),
        },
        _ => step.target.clone(),
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        for line in self.render(&event) {
            self.line(line);
        }
    }
}
