use ratatui::text::Span;

use crate::bucket::BucketedPoint;

use super::theme::{MIN_Y_MAX_SECS, Y_HEADROOM};

/// Picks one of the two plotted fields of a point.
pub(super) type ValueOf = fn(&BucketedPoint) -> Option<f64>;

pub(super) const fn ttfb_of(point: &BucketedPoint) -> Option<f64> {
    point.ttfb
}

pub(super) const fn loading_delay_of(point: &BucketedPoint) -> Option<f64> {
    point.loading_delay
}

pub(super) fn format_seconds(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |secs| format!("{:.3}s", secs))
}

fn index_to_x(index: usize) -> f64 {
    f64::from(u32::try_from(index).unwrap_or(u32::MAX))
}

/// Present values split into runs of consecutive labels, so an absent
/// bucket leaves a gap instead of a bridging line.
pub(super) fn series_segments(points: &[BucketedPoint], value: ValueOf) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (index, point) in points.iter().enumerate() {
        match value(point) {
            Some(y) => current.push((index_to_x(index), y)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

pub(super) fn present_points(points: &[BucketedPoint], value: ValueOf) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| value(point).map(|y| (index_to_x(index), y)))
        .collect()
}

/// Most recent present value in label order.
pub(super) fn latest_value(points: &[BucketedPoint], value: ValueOf) -> Option<f64> {
    points.iter().rev().find_map(value)
}

pub(super) fn x_axis_max(points: &[BucketedPoint]) -> f64 {
    index_to_x(points.len().saturating_sub(1)).max(1.0)
}

#[expect(
    clippy::float_arithmetic,
    reason = "Axis bounds scale the largest value in seconds"
)]
pub(super) fn y_axis_max(points: &[BucketedPoint], value: ValueOf) -> f64 {
    let largest = points
        .iter()
        .filter_map(value)
        .filter(|y| y.is_finite())
        .fold(0.0_f64, f64::max);
    (largest * Y_HEADROOM).max(MIN_Y_MAX_SECS)
}

#[expect(
    clippy::float_arithmetic,
    reason = "Axis labels split the y range in half"
)]
pub(super) fn y_axis_labels(max: f64) -> Vec<Span<'static>> {
    [0.0, max / 2.0, max]
        .into_iter()
        .map(|tick| Span::raw(format!("{:.2}s", tick)))
        .collect()
}

/// First, middle and last label of the series.
pub(super) fn x_axis_labels(points: &[BucketedPoint]) -> Vec<Span<'static>> {
    let last = points.len().saturating_sub(1);
    let middle = last.checked_div(2).unwrap_or(0);
    let mut indices = vec![0, middle, last];
    indices.dedup();
    indices
        .into_iter()
        .filter_map(|index| points.get(index))
        .map(|point| Span::raw(point.label.clone()))
        .collect()
}
