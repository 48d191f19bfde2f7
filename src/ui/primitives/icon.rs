use crossterm::style::Stylize;

use crate::domain::entities::StepKind;
use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Skipped,
    Arrow,
    Command,
    Remote,
    Trash,
}

impl Icon {
    /// Icon shown next to a step of this kind
    pub fn for_step(kind: StepKind) -> Icon {
        match kind {
            StepKind::DirCreated | StepKind::FileWritten | StepKind::CommandOk => Icon::Success,
            StepKind::DirSkippedExists => Icon::Skipped,
            StepKind::FileRemoved => Icon::Trash,
            StepKind::DirFailed | StepKind::TransferFailed | StepKind::CommandFailed => Icon::Error,
        }
    }

    pub fn render(&self, supports_unicode: bool) -> &'static str {
        match (supports_unicode, self) {
            (true, Icon::Success) => theme::icons::SUCCESS,
            (true, Icon::Error) => theme::icons::ERROR,
            (true, Icon::Warning) => theme::icons::WARNING,
            (true, Icon::Progress) => theme::icons::PROGRESS,
            (true, Icon::Skipped) => theme::icons::SKIPPED,
            (true, Icon::Arrow) => theme::icons::ARROW,
            (true, Icon::Command) => theme::icons::COMMAND,
            (true, Icon::Remote) => theme::icons::REMOTE,
            (true, Icon::Trash) => theme::icons::TRASH,
            (false, Icon::Success) => theme::icons_ascii::SUCCESS,
            (false, Icon::Error) => theme::icons_ascii::ERROR,
            (false, Icon::Warning) => theme::icons_ascii::WARNING,
            (false, Icon::Progress) => theme::icons_ascii::PROGRESS,
            (false, Icon::Skipped) => theme::icons_ascii::SKIPPED,
            (false, Icon::Arrow) => theme::icons_ascii::ARROW,
            (false, Icon::Command) => theme::icons_ascii::COMMAND,
            (false, Icon::Remote) => theme::icons_ascii::REMOTE,
            (false, Icon::Trash) => theme::icons_ascii::TRASH,
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        let s = self.render(supports_unicode);
        if !supports_color {
            return s.to_string();
        }
        let color = match self {
            Icon::Success => theme::colors::SUCCESS,
            Icon::Error => theme::colors::ERROR,
            Icon::Warning | Icon::Progress | Icon::Trash => theme::colors::WARNING,
            Icon::Skipped | Icon::Arrow => theme::colors::DIM,
            Icon::Command | Icon::Remote => theme::colors::INFO,
        };
        format!("{}", s.with(color))
    }
}
