//! Severity colors for the event table

use ratatui::style::{Color, Style};

use crate::event::Severity;

/// Styles used to paint the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub header: Style,
    pub ok: Style,
    pub warning: Style,
    pub critical: Style,
    pub unknown: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Green, yellow and red on black; unknown events inverted
    pub fn classic() -> Self {
        let on_black = Style::default().bg(Color::Black);
        Self {
            header: on_black.fg(Color::Green),
            ok: on_black.fg(Color::Green),
            warning: on_black.fg(Color::Yellow),
            critical: on_black.fg(Color::Red),
            unknown: Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Ok => self.ok,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Unknown => self.unknown,
        }
    }
}
