use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};
use crate::ui::model::DashboardView;
use crate::ui::render::{TerminalGuard, Ui, UiActions};

use super::DashboardSettings;
use super::controller::Controller;
use super::input::spawn_input_reader;
use super::refresh::local_now;
use super::session::DashboardSession;
use super::source::MeasurementSource;

/// Redraw cadence; also paces the loading spinner.
const FRAME_INTERVAL: Duration = Duration::from_millis(200);

pub(super) async fn run_interactive(
    settings: &DashboardSettings,
    source: Arc<dyn MeasurementSource>,
) -> AppResult<()> {
    let (shutdown_tx, _) = shutdown_channel();
    let mut shutdown_rx = shutdown_tx.subscribe();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut terminal = Ui::setup_terminal()?;
    let guard = TerminalGuard;

    let (inputs_tx, mut inputs_rx) = mpsc::unbounded_channel();
    let (ticks_tx, mut ticks_rx) = mpsc::unbounded_channel();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let input_handle = spawn_input_reader(inputs_tx, &shutdown_tx);

    let session = DashboardSession::new(
        settings.sites.clone(),
        settings.granularity,
        settings.auto_refresh,
    );
    let mut controller = Controller::new(
        session,
        settings.refresh_interval,
        source,
        local_now,
        ticks_tx,
        events_tx,
    );
    info!(
        "Dashboard started for {} sites against {}",
        settings.sites.len(),
        settings.api_url
    );
    controller.start();

    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: usize = 0;

    loop {
        let view = DashboardView::from_session(
            controller.session(),
            local_now().date(),
            settings.refresh_interval,
            settings.no_color,
            tick,
        );
        Ui::render(&mut terminal, &view);

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            Some(input) = inputs_rx.recv() => {
                if !controller.handle_input(input) {
                    break;
                }
            }
            Some(trigger) = ticks_rx.recv() => {
                controller.trigger(trigger);
            }
            Some(event) = events_rx.recv() => controller.apply(event),
            _ = frames.tick() => {
                if controller.session().is_busy() {
                    tick = tick.wrapping_add(1);
                }
            }
        }
    }

    controller.stop();
    drop(shutdown_tx.send(()));
    drop(guard);

    if let Err(err) = input_handle.await {
        warn!("Keyboard reader failed: {}", err);
    }
    if let Err(err) = signal_handle.await {
        warn!("Signal handler failed: {}", err);
    }
    info!("Dashboard closed");
    Ok(())
}
