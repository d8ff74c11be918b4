//! Terminal setup and teardown

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Switch to raw mode on the alternate screen and hide the cursor
pub fn setup() -> crate::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    tracing::debug!("Terminal initialized");
    Ok(terminal)
}

/// Undo [`setup`]. Every step is attempted and the first failure is returned.
pub fn restore(terminal: &mut CrosstermTerminal) -> crate::Result<()> {
    let raw_mode = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    first_error([raw_mode, screen, cursor])?;
    tracing::debug!("Terminal restored");
    Ok(())
}

/// The first error in `results`, or `Ok` when there is none
pub fn first_error<E>(results: impl IntoIterator<Item = Result<(), E>>) -> Result<(), E> {
    results.into_iter().collect()
}
