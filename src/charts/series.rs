use std::path::Path;

use plotters::prelude::*;

use crate::bucket::BucketedPoint;
use crate::error::AppResult;

const CHART_SIZE: (u32, u32) = (1600, 600);
const LINE_WIDTH: u32 = 2;
const DOT_RADIUS: i32 = 4;
/// Headroom above the largest plotted value.
const Y_HEADROOM: f64 = 1.2;
/// Y range used when every value is absent or zero.
const MIN_Y_MAX_SECS: f64 = 0.1;

pub(super) struct MetricChart<'chart> {
    pub(super) title: String,
    pub(super) y_desc: &'chart str,
    pub(super) color: RGBColor,
    pub(super) value: fn(&BucketedPoint) -> Option<f64>,
}

/// Consecutive present values as `(index, seconds)` runs; absent buckets
/// split runs so they are drawn as gaps.
pub(super) fn present_runs(
    points: &[BucketedPoint],
    value: fn(&BucketedPoint) -> Option<f64>,
) -> Vec<Vec<(i32, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(i32, f64)> = Vec::new();
    for (index, point) in points.iter().enumerate() {
        let x = i32::try_from(index).unwrap_or(i32::MAX);
        match value(point).filter(|y| y.is_finite()) {
            Some(y) => current.push((x, y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[expect(
    clippy::float_arithmetic,
    reason = "Axis bounds scale the largest value in seconds"
)]
fn y_upper_bound(runs: &[Vec<(i32, f64)>]) -> f64 {
    let largest = runs
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    (largest * Y_HEADROOM).max(MIN_Y_MAX_SECS)
}

pub(super) fn plot_metric(
    points: &[BucketedPoint],
    metric: &MetricChart<'_>,
    path: &Path,
) -> AppResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let runs = present_runs(points, metric.value);
    let x_max = i32::try_from(points.len()).unwrap_or(i32::MAX).max(1);
    let y_max = y_upper_bound(&runs);
    let labels: Vec<&str> = points.iter().map(|point| point.label.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(&metric.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .y_desc(metric.y_desc)
        .x_labels(labels.len())
        .y_labels(10)
        .x_label_formatter(&|x| {
            usize::try_from(*x)
                .ok()
                .and_then(|index| labels.get(index))
                .map(|label| (*label).to_owned())
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| format!("{:.2}s", y))
        .draw()?;

    let color = metric.color;
    for run in &runs {
        chart.draw_series(LineSeries::new(
            run.iter().copied(),
            color.stroke_width(LINE_WIDTH),
        ))?;
        chart.draw_series(
            run.iter()
                .map(|&(x, y)| Circle::new((x, y), DOT_RADIUS, color.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}
