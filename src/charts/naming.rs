use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::bucket::Granularity;
use crate::ui::model::site_display_name;

pub(super) fn run_dir_name(now: NaiveDateTime) -> String {
    format!(
        "run-{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

pub(super) fn chart_file_name(site: &str, granularity: Granularity, metric: &str) -> String {
    format!(
        "{}_{}_{}.png",
        sanitize_segment(&site_display_name(site)),
        granularity,
        metric
    )
}

fn sanitize_segment(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '.' => ch,
            _ => '-',
        })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "site".to_owned()
    } else {
        trimmed.to_owned()
    }
}
