use std::time::Duration;

use ratatui::{
    layout::Rect,
    prelude::{Backend, Frame},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::dashboard::RefreshPhase;
use crate::ui::model::DashboardView;

use super::theme::{
    ACCENT_AMBER_RGB, ACCENT_GREEN_RGB, PANEL_MUTED_RGB, SPINNER_FRAMES, muted_style,
    panel_block_style, panel_border_style, panel_title_style, rgb, style_color,
};

const TITLE: &str = "Website Performance Monitor";
const GAP: &str = "   ";

pub(super) fn spinner(tick: usize) -> &'static str {
    let frame = tick.checked_rem(SPINNER_FRAMES.len()).unwrap_or(0);
    SPINNER_FRAMES.get(frame).copied().unwrap_or_default()
}

pub(super) fn format_interval(interval: Duration) -> String {
    if interval.subsec_millis() == 0 {
        format!("{}s", interval.as_secs())
    } else {
        format!("{}ms", interval.as_millis())
    }
}

pub(super) fn refresh_state_text(phase: RefreshPhase, tick: usize) -> String {
    match phase {
        RefreshPhase::Idle => "Idle".to_owned(),
        RefreshPhase::Loading => format!("{} Loading", spinner(tick)),
        RefreshPhase::Refreshing => format!("{} Refreshing", spinner(tick)),
    }
}

pub(super) fn render_header<B: Backend>(f: &mut Frame<'_, B>, view: &DashboardView, area: Rect) {
    let no_color = view.no_color;
    let updated = view.last_updated.map_or_else(
        || "--:--:--".to_owned(),
        |at| at.format("%H:%M:%S").to_string(),
    );
    let state_color = if view.phase == RefreshPhase::Idle {
        ACCENT_GREEN_RGB
    } else {
        ACCENT_AMBER_RGB
    };
    let (auto_text, auto_color) = if view.auto_refresh {
        (
            format!("Auto-refresh: ON ({})", format_interval(view.refresh_interval)),
            ACCENT_GREEN_RGB,
        )
    } else {
        ("Auto-refresh: OFF".to_owned(), PANEL_MUTED_RGB)
    };

    let line = Line::from(vec![
        Span::styled("Last updated: ", muted_style(no_color)),
        Span::styled(updated, panel_title_style(no_color)),
        Span::raw(GAP),
        Span::styled(
            refresh_state_text(view.phase, view.tick),
            style_color(no_color, rgb(state_color)),
        ),
        Span::raw(GAP),
        Span::styled(auto_text, style_color(no_color, rgb(auto_color))),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .title(TITLE)
            .borders(Borders::ALL)
            .style(panel_block_style(no_color))
            .border_style(panel_border_style(no_color))
            .title_style(panel_title_style(no_color)),
    );
    f.render_widget(header, area);
}

pub(super) fn render_footer<B: Backend>(f: &mut Frame<'_, B>, view: &DashboardView, area: Rect) {
    let refresh_hint = if view.phase == RefreshPhase::Idle {
        "r refresh"
    } else {
        "r refresh (busy)"
    };
    let hints = [
        "Up/Down site",
        "d/w/m granularity",
        "Tab next granularity",
        refresh_hint,
        "a auto-refresh",
        "q quit",
    ];
    let footer = Paragraph::new(Line::from(Span::styled(
        hints.join("  |  "),
        muted_style(view.no_color),
    )));
    f.render_widget(footer, area);
}
