//! Event table formatting and painting

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::event::Event;
use crate::theme::Theme;

/// Title painted on the first terminal line
pub const HEADER: &str = " SensuTop";

/// Columns left blank before each event row
pub const ROW_INDENT: usize = 1;

/// Number of event rows that fit below the header
pub fn visible_rows(area: Rect) -> usize {
    usize::from(area.height.saturating_sub(1))
}

/// Remove characters that would break a row across terminal lines
pub fn sanitize(field: &str) -> String {
    field
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Widths of the client, check and output columns for a set of rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    pub client: usize,
    pub check: usize,
    pub output: usize,
}

impl ColumnWidths {
    /// The widest sanitized value of each column among `events`
    pub fn fit(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |widths, event| Self {
            client: widths.client.max(sanitize(&event.client).chars().count()),
            check: widths.check.max(sanitize(&event.check).chars().count()),
            output: widths.output.max(sanitize(&event.output).chars().count()),
        })
    }
}

/// Format one event as an aligned row of at most `max_width` characters
pub fn format_row(event: &Event, widths: &ColumnWidths, max_width: usize) -> String {
    let row = format!(
        "{:<client$} {:<check$} {:<output$}",
        sanitize(&event.client),
        sanitize(&event.check),
        sanitize(&event.output),
        client = widths.client,
        check = widths.check,
        output = widths.output,
    );
    row.chars().take(max_width).collect()
}

/// Build the header and one styled line per event for a `width` column terminal
pub fn table_lines(events: &[Event], width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let widths = ColumnWidths::fit(events);
    let max_width = usize::from(width).saturating_sub(ROW_INDENT);

    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(Line::from(Span::styled(HEADER, theme.header)));
    lines.extend(events.iter().map(|event| {
        let row = format_row(event, &widths, max_width);
        Line::from(vec![
            Span::raw(" ".repeat(ROW_INDENT)),
            Span::styled(row, theme.severity_style(event.severity())),
        ])
    }));
    lines
}

/// Paint the event table over the whole frame
pub fn draw(frame: &mut Frame, events: &[Event], theme: &Theme) {
    let area = frame.area();
    let shown = &events[..events.len().min(visible_rows(area))];
    let lines = table_lines(shown, area.width, theme);
    frame.render_widget(Paragraph::new(lines), area);
}
