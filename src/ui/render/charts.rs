use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::{Backend, Frame},
    style::Color,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::ui::model::{DashboardView, SiteCard};

use super::formatting::{
    ValueOf, format_seconds, latest_value, loading_delay_of, present_points, series_segments,
    ttfb_of, x_axis_labels, x_axis_max, y_axis_labels, y_axis_max,
};
use super::theme::{
    ACCENT_LOADING_RGB, ACCENT_RED_RGB, ACCENT_TTFB_RGB, CHART_ROW_BOTTOM, CHART_ROW_TOP,
    muted_style, panel_block_style, panel_border_style, panel_title_style, rgb, style_color,
};

/// Plot data for one metric; owns the points the datasets borrow.
struct MetricSeries {
    segments: Vec<Vec<(f64, f64)>>,
    dots: Vec<(f64, f64)>,
    x_max: f64,
    y_max: f64,
}

impl MetricSeries {
    fn new(card: &SiteCard, value: ValueOf) -> Self {
        Self {
            segments: series_segments(&card.points, value),
            dots: present_points(&card.points, value),
            x_max: x_axis_max(&card.points),
            y_max: y_axis_max(&card.points, value),
        }
    }
}

pub(super) fn render_site_charts<B: Backend>(
    f: &mut Frame<'_, B>,
    view: &DashboardView,
    area: Rect,
) {
    let Some(card) = view.selected_card() else {
        let empty = Paragraph::new("No sites configured.")
            .alignment(Alignment::Center)
            .style(muted_style(view.no_color));
        f.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(CHART_ROW_TOP),
            Constraint::Percentage(CHART_ROW_BOTTOM),
        ])
        .split(area);
    let (top, bottom) = match rows.as_ref() {
        [a, b] => (a, b),
        _ => return,
    };

    render_metric_chart(
        f,
        view,
        card,
        *top,
        MetricChart {
            name: "TTFB",
            value: ttfb_of,
            color: rgb(ACCENT_TTFB_RGB),
        },
    );
    render_metric_chart(
        f,
        view,
        card,
        *bottom,
        MetricChart {
            name: "Loading delay",
            value: loading_delay_of,
            color: rgb(ACCENT_LOADING_RGB),
        },
    );
}

#[derive(Clone, Copy)]
struct MetricChart {
    name: &'static str,
    value: ValueOf,
    color: Color,
}

fn render_metric_chart<B: Backend>(
    f: &mut Frame<'_, B>,
    view: &DashboardView,
    card: &SiteCard,
    area: Rect,
    metric: MetricChart,
) {
    let no_color = view.no_color;
    let series = MetricSeries::new(card, metric.value);
    let line_style = style_color(no_color, metric.color);

    let mut datasets: Vec<Dataset<'_>> = series
        .segments
        .iter()
        .map(|segment| {
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(line_style)
                .data(segment)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(line_style)
            .data(&series.dots),
    );

    let mut title = vec![Span::styled(
        format!(
            "{} - {} (s) - {} ",
            card.name(),
            metric.name,
            card.granularity.description()
        ),
        panel_title_style(no_color),
    )];
    if card.fetch_failed {
        title.push(Span::styled(
            "[fetch failed] ",
            style_color(no_color, rgb(ACCENT_RED_RGB)),
        ));
    } else {
        title.push(Span::styled(
            format!("latest {} ", format_seconds(latest_value(&card.points, metric.value))),
            muted_style(no_color),
        ));
    }

    let chart = Chart::new(datasets)
        .style(panel_block_style(no_color))
        .block(
            Block::default()
                .title(ratatui::text::Line::from(title))
                .borders(Borders::ALL)
                .style(panel_block_style(no_color))
                .border_style(panel_border_style(no_color)),
        )
        .hidden_legend_constraints((Constraint::Ratio(0, 1), Constraint::Ratio(0, 1)))
        .x_axis(
            Axis::default()
                .style(muted_style(no_color))
                .bounds([0.0, series.x_max])
                .labels(x_axis_labels(&card.points)),
        )
        .y_axis(
            Axis::default()
                .style(muted_style(no_color))
                .bounds([0.0, series.y_max])
                .labels_alignment(Alignment::Right)
                .labels(y_axis_labels(series.y_max)),
        );
    f.render_widget(chart, area);
}
