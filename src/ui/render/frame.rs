use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::{Backend, Frame},
    widgets::Block,
};

use crate::ui::model::DashboardView;

use super::charts::render_site_charts;
use super::header::{render_footer, render_header};
use super::sites::render_site_list;
use super::theme::{
    CHART_MIN_HEIGHT, FOOTER_HEIGHT, HEADER_HEIGHT, SITE_LIST_WIDTH, UI_MARGIN,
    app_background_style,
};

pub fn draw_frame<B: Backend>(f: &mut Frame<'_, B>, view: &DashboardView) {
    let size = f.size();
    f.render_widget(
        Block::default().style(app_background_style(view.no_color)),
        size,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(UI_MARGIN)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(CHART_MIN_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(size);
    let (header_chunk, body_chunk, footer_chunk) = match rows.as_ref() {
        [a, b, c] => (a, b, c),
        _ => return,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SITE_LIST_WIDTH), Constraint::Min(0)])
        .split(*body_chunk);
    let (list_chunk, chart_chunk) = match columns.as_ref() {
        [a, b] => (a, b),
        _ => return,
    };

    render_header(f, view, *header_chunk);
    render_site_list(f, view, *list_chunk);
    render_site_charts(f, view, *chart_chunk);
    render_footer(f, view, *footer_chunk);
}
