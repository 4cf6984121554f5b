use ratatui::{
    layout::Rect,
    prelude::{Backend, Frame},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::ui::model::{DashboardView, SiteCard};

use super::formatting::{format_seconds, latest_value, ttfb_of};
use super::theme::{
    ACCENT_RED_RGB, muted_style, panel_block_style, panel_border_style, panel_title_style, rgb,
    selected_style, style_color,
};

fn site_item(card: &SiteCard, no_color: bool) -> ListItem<'static> {
    let status = if card.fetch_failed {
        Span::styled(" !", style_color(no_color, rgb(ACCENT_RED_RGB)))
    } else {
        Span::raw("")
    };
    let latest = if card.loaded {
        format_seconds(latest_value(&card.points, ttfb_of))
    } else {
        "...".to_owned()
    };
    ListItem::new(vec![
        Line::from(vec![Span::raw(card.name()), status]),
        Line::from(Span::styled(
            format!("  {} | TTFB {}", card.granularity, latest),
            muted_style(no_color),
        )),
    ])
}

pub(super) fn render_site_list<B: Backend>(
    f: &mut Frame<'_, B>,
    view: &DashboardView,
    area: Rect,
) {
    let no_color = view.no_color;
    let items: Vec<ListItem<'static>> = view
        .cards
        .iter()
        .map(|card| site_item(card, no_color))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Sites ({})", view.cards.len()))
                .borders(Borders::ALL)
                .style(panel_block_style(no_color))
                .border_style(panel_border_style(no_color))
                .title_style(panel_title_style(no_color)),
        )
        .highlight_style(selected_style(no_color))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !view.cards.is_empty() {
        state.select(Some(view.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
