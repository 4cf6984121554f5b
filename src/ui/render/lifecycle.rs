use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, prelude::Backend};
use std::io;
use tracing::warn;

use crate::error::AppResult;
use crate::ui::model::DashboardView;

use super::frame::draw_frame;

pub trait UiActions {
    /// Switches to raw mode on the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error when terminal setup fails.
    fn setup_terminal() -> AppResult<Terminal<CrosstermBackend<io::Stdout>>>;
    fn cleanup();
    fn render<B: Backend>(terminal: &mut Terminal<B>, view: &DashboardView);
}

pub struct Ui;

impl UiActions for Ui {
    fn setup_terminal() -> AppResult<Terminal<CrosstermBackend<io::Stdout>>> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(io::stdout());
        match Terminal::new(backend) {
            Ok(mut terminal) => {
                if let Err(err) = terminal.clear() {
                    Self::cleanup();
                    return Err(err.into());
                }
                if let Err(err) = terminal.hide_cursor() {
                    warn!("Failed to hide cursor: {}", err);
                }
                Ok(terminal)
            }
            Err(err) => {
                Self::cleanup();
                Err(err.into())
            }
        }
    }

    fn cleanup() {
        disable_raw_mode().ok();
        execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show).ok();
    }

    fn render<B: Backend>(terminal: &mut Terminal<B>, view: &DashboardView) {
        if let Err(err) = terminal.draw(|f| draw_frame(f, view)) {
            warn!("Failed to render dashboard: {}", err);
        }
    }
}

/// Restores the terminal when dropped, including on early returns.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Ui::cleanup();
    }
}
