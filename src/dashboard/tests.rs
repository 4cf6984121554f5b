use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use super::*;
use crate::error::{AppError, AppResult};
use crate::store::Measurement;

const SITE_A: &str = "https://www.alpha.example";
const SITE_B: &str = "https://beta.example";
const SITE_C: &str = "https://gamma.example";
const FETCH_DELAY: Duration = Duration::from_millis(5);
const TIMER_PERIOD: Duration = Duration::from_millis(20);
const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|date| date.and_hms_opt(14, 30, 0))
        .unwrap_or_default()
}

fn measurement(site: &str, timestamp: &str, ttfb: f64) -> Measurement {
    Measurement {
        site: site.to_owned(),
        timestamp: timestamp.to_owned(),
        ttfb: Some(ttfb),
        loading_delay: None,
    }
}

#[derive(Default)]
struct FakeSource {
    rows: HashMap<String, Vec<Measurement>>,
    failing: Vec<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    fn with_rows(mut self, site: &str, rows: Vec<Measurement>) -> Self {
        self.rows.insert(site.to_owned(), rows);
        self
    }

    fn failing_for(mut self, site: &str) -> Self {
        self.failing.push(site.to_owned());
        self
    }

    fn calls(&self) -> AppResult<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .map_err(|err| AppError::validation(format!("calls lock poisoned: {}", err)))
    }
}

#[async_trait]
impl MeasurementSource for FakeSource {
    async fn fetch(&self, site: &str) -> AppResult<Vec<Measurement>> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(site.to_owned());
        }
        tokio::time::sleep(FETCH_DELAY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.iter().any(|failing| failing == site) {
            return Err(AppError::validation("fake fetch failure"));
        }
        Ok(self.rows.get(site).cloned().unwrap_or_default())
    }
}

fn sites() -> Vec<String> {
    vec![SITE_A.to_owned(), SITE_B.to_owned(), SITE_C.to_owned()]
}

#[test]
fn refresh_fetches_sites_one_at_a_time_in_order() -> AppResult<()> {
    run_async_test(async {
        let source = FakeSource::default();
        let session = DashboardSession::new(sites(), Granularity::Daily, true);
        let session = refresh(session, &source, RefreshTrigger::Initial, fixed_now).await;

        if source.max_in_flight.load(Ordering::SeqCst) != 1 {
            return Err(AppError::validation("Expected sequential fetches"));
        }
        if source.calls()? != sites() {
            return Err(AppError::validation("Expected fetches in site order"));
        }
        if session.is_busy() || session.last_updated() != Some(fixed_now()) {
            return Err(AppError::validation("Expected an idle session stamped now"));
        }
        Ok(())
    })
}

#[test]
fn refresh_buckets_rows_for_each_site() -> AppResult<()> {
    run_async_test(async {
        let source = FakeSource::default().with_rows(
            SITE_A,
            vec![
                measurement(SITE_A, "2026-10-14 13:05:00", 1.0),
                measurement(SITE_A, "2026-10-14 13:45:00", 3.0),
                measurement(SITE_A, "2026-10-13 13:45:00", 9.0),
            ],
        );
        let session = DashboardSession::new(sites(), Granularity::Daily, false);
        let session = refresh(session, &source, RefreshTrigger::Initial, fixed_now).await;

        let series = session
            .series_at(0)
            .ok_or_else(|| AppError::validation("Expected series for first site"))?;
        if series.points.len() != 24 || series.fetch_failed {
            return Err(AppError::validation("Expected 24 daily buckets"));
        }
        let one_pm = series
            .points
            .get(13)
            .ok_or_else(|| AppError::validation("Missing 13:00 bucket"))?;
        if one_pm.label != "13:00" || one_pm.ttfb != Some(2.0) {
            return Err(AppError::validation(format!("Unexpected bucket: {:?}", one_pm)));
        }
        Ok(())
    })
}

#[test]
fn failed_site_degrades_to_empty_series() -> AppResult<()> {
    run_async_test(async {
        let source = FakeSource::default()
            .with_rows(SITE_C, vec![measurement(SITE_C, "2026-10-14 09:00:00", 0.5)])
            .failing_for(SITE_B);
        let session = DashboardSession::new(sites(), Granularity::Weekly, false);
        let session = refresh(session, &source, RefreshTrigger::Initial, fixed_now).await;

        let failed = session
            .series_at(1)
            .ok_or_else(|| AppError::validation("Expected series for failed site"))?;
        if !failed.fetch_failed || failed.points.len() != 7 {
            return Err(AppError::validation("Expected flagged empty weekly series"));
        }
        if failed.points.iter().any(|point| point.ttfb.is_some()) {
            return Err(AppError::validation("Expected all-absent values"));
        }
        let after = session
            .series_at(2)
            .ok_or_else(|| AppError::validation("Expected the cycle to continue"))?;
        if after.fetch_failed || !after.points.iter().any(|point| point.ttfb.is_some()) {
            return Err(AppError::validation("Expected later site to load"));
        }
        Ok(())
    })
}

#[test]
fn busy_session_rejects_new_cycles() -> AppResult<()> {
    let mut session = DashboardSession::new(sites(), Granularity::Daily, true);
    let plan = session
        .begin_refresh(RefreshTrigger::Initial)
        .ok_or_else(|| AppError::validation("Expected first plan"))?;
    if plan.targets.len() != 3 || session.phase() != RefreshPhase::Loading {
        return Err(AppError::validation("Unexpected initial plan"));
    }
    if session.begin_refresh(RefreshTrigger::Timer).is_some()
        || session.begin_refresh(RefreshTrigger::Manual).is_some()
    {
        return Err(AppError::validation("Expected busy guard to reject"));
    }
    session.apply(CycleEvent::Finished {
        trigger: RefreshTrigger::Initial,
        completed_at: fixed_now(),
    });
    if session.phase() != RefreshPhase::Idle {
        return Err(AppError::validation("Expected idle after finish"));
    }
    match session.begin_refresh(RefreshTrigger::Timer) {
        Some(_) if session.phase() == RefreshPhase::Refreshing => Ok(()),
        Some(_) | None => Err(AppError::validation("Expected timer refresh after finish")),
    }
}

#[test]
fn granularity_change_while_busy_is_deferred() -> AppResult<()> {
    let mut session = DashboardSession::new(sites(), Granularity::Daily, true);
    if session.begin_refresh(RefreshTrigger::Timer).is_none() {
        return Err(AppError::validation("Expected timer plan"));
    }
    if !session.set_selected_granularity(Granularity::Monthly) {
        return Err(AppError::validation("Expected granularity to change"));
    }
    if session.begin_refresh(RefreshTrigger::GranularityChanged).is_some() {
        return Err(AppError::validation("Expected busy rejection"));
    }
    if session.take_pending_reload().is_some() {
        return Err(AppError::validation("Reload must wait for the running cycle"));
    }
    session.apply(CycleEvent::Finished {
        trigger: RefreshTrigger::Timer,
        completed_at: fixed_now(),
    });
    if session.take_pending_reload() != Some(RefreshTrigger::GranularityChanged) {
        return Err(AppError::validation("Expected deferred reload"));
    }
    if session.take_pending_reload().is_some() {
        return Err(AppError::validation("Deferred reload is handed out once"));
    }
    let plan = session
        .begin_refresh(RefreshTrigger::GranularityChanged)
        .ok_or_else(|| AppError::validation("Expected reload plan"))?;
    if plan.targets.first() != Some(&(SITE_A.to_owned(), Granularity::Monthly)) {
        return Err(AppError::validation("Expected the new granularity in the plan"));
    }
    Ok(())
}

#[test]
fn selection_wraps_around() -> AppResult<()> {
    let mut session = DashboardSession::new(sites(), Granularity::Daily, true);
    session.select_previous();
    if session.selected_site() != Some(SITE_C) {
        return Err(AppError::validation("Expected wrap to last site"));
    }
    session.select_next();
    if session.selected_index() != 0 {
        return Err(AppError::validation("Expected wrap to first site"));
    }
    let mut empty = DashboardSession::new(Vec::new(), Granularity::Daily, true);
    empty.select_next();
    empty.select_previous();
    if empty.selected_site().is_some() {
        return Err(AppError::validation("Expected no selection without sites"));
    }
    Ok(())
}

#[test]
fn run_cycle_streams_sites_before_finishing() -> AppResult<()> {
    run_async_test(async {
        let source = FakeSource::default();
        let mut session = DashboardSession::new(sites(), Granularity::Daily, true);
        let plan = session
            .begin_refresh(RefreshTrigger::Manual)
            .ok_or_else(|| AppError::validation("Expected plan"))?;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        run_cycle(plan, &source, fixed_now, &events_tx).await;
        drop(events_tx);

        let mut loaded = Vec::new();
        let mut finished = 0_usize;
        while let Some(event) = events_rx.recv().await {
            match event {
                CycleEvent::SiteLoaded(series) if finished == 0 => loaded.push(series.site),
                CycleEvent::SiteLoaded(_) => {
                    return Err(AppError::validation("Site loaded after finish"));
                }
                CycleEvent::Finished { trigger, .. } if trigger == RefreshTrigger::Manual => {
                    finished = finished.saturating_add(1);
                }
                CycleEvent::Finished { .. } => {
                    return Err(AppError::validation("Unexpected trigger on finish"));
                }
            }
        }
        if loaded != sites() || finished != 1 {
            return Err(AppError::validation("Expected three sites then one finish"));
        }
        Ok(())
    })
}

#[test]
fn auto_refresh_ticks_until_stopped() -> AppResult<()> {
    run_async_test(async {
        let (ticks_tx, mut ticks_rx) = mpsc::unbounded_channel();
        let mut timer = AutoRefresh::new(TIMER_PERIOD);
        timer.start(ticks_tx);
        if !timer.is_running() {
            return Err(AppError::validation("Expected running timer"));
        }

        let tick = tokio::time::timeout(WAIT_TIMEOUT, ticks_rx.recv())
            .await
            .map_err(|err| AppError::validation(format!("Timed out waiting for tick: {}", err)))?;
        if tick != Some(RefreshTrigger::Timer) {
            return Err(AppError::validation("Expected timer trigger"));
        }

        timer.stop();
        if timer.is_running() {
            return Err(AppError::validation("Expected stopped timer"));
        }
        loop {
            let next = tokio::time::timeout(WAIT_TIMEOUT, ticks_rx.recv())
                .await
                .map_err(|err| AppError::validation(format!("Channel stayed open after stop: {}", err)))?;
            if next.is_none() {
                break;
            }
        }
        Ok(())
    })
}

#[test]
fn controller_runs_initial_cycle_and_reacts_to_input() -> AppResult<()> {
    run_async_test(async {
        let source: Arc<dyn MeasurementSource> = Arc::new(FakeSource::default());
        let (ticks_tx, _ticks_rx) = mpsc::unbounded_channel();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let session = DashboardSession::new(sites(), Granularity::Daily, false);
        let mut controller =
            Controller::new(session, TIMER_PERIOD, source, fixed_now, ticks_tx, events_tx);

        controller.start();
        if !controller.session().is_busy() || controller.timer_running() {
            return Err(AppError::validation("Expected loading without a timer"));
        }
        if controller.trigger(RefreshTrigger::Manual) {
            return Err(AppError::validation("Expected manual refresh to be rejected"));
        }
        if !controller.handle_input(DashboardInput::SetGranularity(Granularity::Weekly)) {
            return Err(AppError::validation("Granularity input must not quit"));
        }

        let mut finishes = 0_usize;
        while finishes < 2 {
            let event = tokio::time::timeout(WAIT_TIMEOUT, events_rx.recv())
                .await
                .map_err(|err| AppError::validation(format!("Timed out waiting for cycle: {}", err)))?
                .ok_or_else(|| AppError::validation("Event channel closed"))?;
            if matches!(event, CycleEvent::Finished { .. }) {
                finishes = finishes.saturating_add(1);
            }
            controller.apply(event);
        }

        let series = controller
            .session()
            .series_at(0)
            .ok_or_else(|| AppError::validation("Expected reloaded series"))?;
        if series.granularity != Granularity::Weekly || controller.session().is_busy() {
            return Err(AppError::validation("Expected weekly reload to complete"));
        }

        if !controller.handle_input(DashboardInput::ToggleAutoRefresh) || !controller.timer_running()
        {
            return Err(AppError::validation("Expected timer after toggle"));
        }
        controller.stop();
        if controller.handle_input(DashboardInput::Quit) {
            return Err(AppError::validation("Expected quit"));
        }
        Ok(())
    })
}

#[test]
fn keys_map_to_dashboard_inputs() -> AppResult<()> {
    let cases = [
        (KeyCode::Char('q'), KeyModifiers::NONE, Some(DashboardInput::Quit)),
        (KeyCode::Esc, KeyModifiers::NONE, Some(DashboardInput::Quit)),
        (KeyCode::Char('c'), KeyModifiers::CONTROL, Some(DashboardInput::Quit)),
        (KeyCode::Down, KeyModifiers::NONE, Some(DashboardInput::SelectNext)),
        (KeyCode::Up, KeyModifiers::NONE, Some(DashboardInput::SelectPrevious)),
        (
            KeyCode::Char('m'),
            KeyModifiers::NONE,
            Some(DashboardInput::SetGranularity(Granularity::Monthly)),
        ),
        (KeyCode::Tab, KeyModifiers::NONE, Some(DashboardInput::NextGranularity)),
        (KeyCode::Char('r'), KeyModifiers::NONE, Some(DashboardInput::Refresh)),
        (KeyCode::Char('a'), KeyModifiers::NONE, Some(DashboardInput::ToggleAutoRefresh)),
        (KeyCode::Char('c'), KeyModifiers::NONE, None),
        (KeyCode::F(5), KeyModifiers::NONE, None),
    ];
    for (code, modifiers, expected) in cases {
        let input = input_for_key(KeyEvent::new(code, modifiers));
        if input != expected {
            return Err(AppError::validation(format!(
                "Unexpected input for {:?}: {:?}",
                code, input
            )));
        }
    }

    let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    if input_for_key(release).is_some() {
        return Err(AppError::validation("Key releases must be ignored"));
    }
    Ok(())
}

#[test]
fn summary_reports_failures_and_averages() -> AppResult<()> {
    run_async_test(async {
        let source = FakeSource::default()
            .with_rows(
                SITE_A,
                vec![
                    measurement(SITE_A, "2026-10-14 10:00:00", 1.0),
                    measurement(SITE_A, "2026-10-14 11:00:00", 2.0),
                ],
            )
            .failing_for(SITE_B);
        let session = DashboardSession::new(sites(), Granularity::Daily, false);
        let session = refresh(session, &source, RefreshTrigger::Initial, fixed_now).await;
        let lines = summary_lines(&session);

        let expected_first = "alpha.example [daily]: 2/24 buckets, avg TTFB 1.500s, avg loading delay n/a";
        if lines.first().map(String::as_str) != Some(expected_first) {
            return Err(AppError::validation(format!("Unexpected summary: {:?}", lines)));
        }
        if lines.get(1).map(String::as_str) != Some("beta.example [daily]: fetch failed") {
            return Err(AppError::validation(format!("Unexpected summary: {:?}", lines)));
        }
        Ok(())
    })
}

#[test]
fn settings_fall_back_to_default_sites() -> AppResult<()> {
    use clap::Parser;

    let args = crate::args::CliArgs::try_parse_from(["sitewatch", "dashboard", "--no-ui"])
        .map_err(|err| AppError::validation(format!("parse failed: {}", err)))?;
    let crate::args::Command::Dashboard(dashboard) = args.command else {
        return Err(AppError::validation("Expected dashboard subcommand"));
    };
    let settings = DashboardSettings::from_args(&dashboard);
    if settings.sites.len() != 10 || settings.interactive() || !settings.auto_refresh {
        return Err(AppError::validation("Unexpected dashboard settings"));
    }
    Ok(())
}
