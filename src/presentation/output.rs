//! Output Rendering
//!
//! Renders a finished `DeploymentReport` as text or JSON. Renderers return
//! strings; the binary decides where they go.

use crossterm::style::Stylize;

use crate::domain::entities::{DeploymentReport, StepKind};
use crate::ui::primitives::icon::Icon;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Overall outcome shown in the report header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    CompletedWithErrors,
    Cancelled,
    Failed,
}

impl Outcome {
    pub fn of(report: &DeploymentReport) -> Self {
        if report.cancelled() {
            Outcome::Cancelled
        } else if !report.success() {
            Outcome::Failed
        } else if report.has_failures() {
            Outcome::CompletedWithErrors
        } else {
            Outcome::Complete
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Complete => "success",
            Outcome::CompletedWithErrors => "partial",
            Outcome::Cancelled => "cancelled",
            Outcome::Failed => "failed",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Outcome::Complete => "Deploy Complete",
            Outcome::CompletedWithErrors => "Deploy Completed with Errors",
            Outcome::Cancelled => "Deploy Cancelled",
            Outcome::Failed => "Deploy Failed",
        }
    }

    fn icon(&self) -> Icon {
        match self {
            Outcome::Complete => Icon::Success,
            Outcome::CompletedWithErrors | Outcome::Cancelled => Icon::Warning,
            Outcome::Failed => Icon::Error,
        }
    }
}

/// Trait for rendering deployment reports
pub trait ReportRenderer {
    fn render(&self, report: &DeploymentReport) -> String;
}

/// Text renderer for deployment reports
pub struct TextRenderer {
    /// Whether to use colors
    pub color: bool,
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            color: true,
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    pub fn plain() -> Self {
        Self {
            color: false,
            unicode: false,
            verbose: 0,
        }
    }

    fn icon(&self, icon: Icon) -> String {
        icon.colored(self.color, self.unicode)
    }
}

impl ReportRenderer for TextRenderer {
    fn render(&self, report: &DeploymentReport) -> String {
        let outcome = Outcome::of(report);
        let mut out = Vec::new();

        let title = if self.color {
            format!("{}", outcome.title().bold())
        } else {
            outcome.title().to_string()
        };
        out.push(format!("{} {}", self.icon(outcome.icon()), title));
        out.push(String::new());
        out.push(format!("  Target: {}", report.target()));

        if let Some(error) = report.connection_error() {
            out.push(format!("  Connection failed: {}", error));
            return out.join("\n");
        }

        out.push(format!(
            "  Directories: {} created, {} already existed",
            report.count(StepKind::DirCreated),
            report.count(StepKind::DirSkippedExists)
        ));
        out.push(format!(
            "  Files: {} written, {} removed",
            report.count(StepKind::FileWritten),
            report.count(StepKind::FileRemoved)
        ));
        out.push(format!(
            "  Commands: {} ok, {} failed",
            report.count(StepKind::CommandOk),
            report.count(StepKind::CommandFailed)
        ));
        if self.verbose > 0 {
            out.push(format!(
                "  Duration: {:.1}s",
                report.duration().num_milliseconds() as f64 / 1000.0
            ));
        }

        let failures: Vec<_> = report.failed_steps().collect();
        if !failures.is_empty() {
            out.push(String::new());
            out.push(format!("  Failures ({}):", failures.len()));
            for step in failures {
                let detail = step
                    .error
                    .as_ref()
                    .map(|e| format!(": {}", e))
                    .unwrap_or_default();
                out.push(format!(
                    "    {} {} {}{}",
                    self.icon(Icon::Error),
                    step.kind,
                    step.target,
                    detail
                ));
            }
        }

        out.join("\n")
    }
}

/// JSON renderer for deployment reports
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn to_value(report: &DeploymentReport) -> serde_json::Value {
        serde_json::json!({
            "event": "report",
            "command": "deploy",
            "status": Outcome::of(report).as_str(),
            "success": report.success(),
            "target": report.target(),
            "connected": report.connected(),
            "connection_error": report.connection_error(),
            "cancelled": report.cancelled(),
            "started_at": report.started_at().to_rfc3339(),
            "finished_at": report.finished_at().to_rfc3339(),
            "duration_ms": report.duration().num_milliseconds(),
            "failures": report.failed_steps().count(),
            "steps": report.steps(),
        })
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &DeploymentReport) -> String {
        serde_json::to_string(&Self::to_value(report)).unwrap_or_default()
    }
}

/// Create a renderer based on format
pub fn create_renderer(
    format: OutputFormat,
    color: bool,
    unicode: bool,
    verbose: u8,
) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer {
            color,
            unicode,
            verbose,
        }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
