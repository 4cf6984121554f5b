use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};
use tokio::sync::{broadcast, mpsc};

use crate::bucket::Granularity;
use crate::shutdown::ShutdownSender;

/// Keyboard polling interval for the terminal dashboard.
const KEYBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks the dashboard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardInput {
    Quit,
    SelectNext,
    SelectPrevious,
    SetGranularity(Granularity),
    NextGranularity,
    Refresh,
    ToggleAutoRefresh,
}

#[must_use]
pub fn input_for_key(key: KeyEvent) -> Option<DashboardInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(DashboardInput::Quit)
        }
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(DashboardInput::Quit),
        KeyCode::Down | KeyCode::Char('j') => Some(DashboardInput::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(DashboardInput::SelectPrevious),
        KeyCode::Char('d') => Some(DashboardInput::SetGranularity(Granularity::Daily)),
        KeyCode::Char('w') => Some(DashboardInput::SetGranularity(Granularity::Weekly)),
        KeyCode::Char('m') => Some(DashboardInput::SetGranularity(Granularity::Monthly)),
        KeyCode::Tab => Some(DashboardInput::NextGranularity),
        KeyCode::Char('r') => Some(DashboardInput::Refresh),
        KeyCode::Char('a') => Some(DashboardInput::ToggleAutoRefresh),
        KeyCode::Backspace
        | KeyCode::Enter
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Char(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => None,
    }
}

/// Reads the terminal on a blocking thread and forwards mapped keys until
/// shutdown is broadcast or the receiver is dropped.
pub fn spawn_input_reader(
    inputs: mpsc::UnboundedSender<DashboardInput>,
    shutdown_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::task::spawn_blocking(move || {
        loop {
            match shutdown_rx.try_recv() {
                Ok(()) | Err(broadcast::error::TryRecvError::Closed) => break,
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Lagged(_),
                ) => {}
            }

            let has_event = poll(KEYBOARD_POLL_INTERVAL).unwrap_or_default();
            if has_event
                && let Ok(Event::Key(key)) = read()
                && let Some(input) = input_for_key(key)
                && inputs.send(input).is_err()
            {
                break;
            }
        }
    })
}
