use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::tempdir;

use sitewatch::bucket::Granularity;
use sitewatch::dashboard::{ApiClient, DashboardSession, MeasurementSource, RefreshTrigger, refresh};
use sitewatch::server::{ErrorPayload, RunningServer, ServerConfig, spawn_server};
use sitewatch::shutdown::shutdown_channel;
use sitewatch::store::{DEFAULT_QUERY_LIMIT, Measurement, MeasurementStore};

const SITE: &str = "https://www.alpha.example";
const OTHER_SITE: &str = "https://beta.example";

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|date| date.and_hms_opt(14, 30, 0))
        .unwrap_or_default()
}

/// 25 rows over the three hours before [`fixed_now`]: 8 at 11:xx, 8 at 12:xx
/// and 9 at 13:xx.
fn three_hours_of_rows() -> Vec<(String, String, f64, f64)> {
    let hours: [(u32, u32, f64, f64); 3] = [(11, 8, 0.25, 1.5), (12, 8, 0.5, 2.0), (13, 9, 0.75, 2.5)];
    let mut rows = Vec::new();
    for (hour, count, ttfb, loading_delay) in hours {
        for minute in 0..count {
            rows.push((
                SITE.to_owned(),
                format!("2026-10-14 {:02}:{:02}:00", hour, minute.saturating_mul(5)),
                ttfb,
                loading_delay,
            ));
        }
    }
    rows
}

fn create_store(path: &Path, rows: &[(String, String, f64, f64)]) -> Result<(), String> {
    let conn = rusqlite::Connection::open(path).map_err(|err| format!("open db failed: {}", err))?;
    conn.execute_batch(
        "CREATE TABLE measurements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            website TEXT,
            timestamp DATETIME,
            ttfb REAL,
            loading_delay REAL
        );",
    )
    .map_err(|err| format!("create table failed: {}", err))?;
    for (site, timestamp, ttfb, loading_delay) in rows {
        conn.execute(
            "INSERT INTO measurements (website, timestamp, ttfb, loading_delay) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![site, timestamp, ttfb, loading_delay],
        )
        .map_err(|err| format!("insert failed: {}", err))?;
    }
    Ok(())
}

async fn start_server(db_path: PathBuf) -> Result<RunningServer, String> {
    let (shutdown_tx, _) = shutdown_channel();
    let config = ServerConfig {
        listen: "127.0.0.1:0"
            .parse()
            .map_err(|err| format!("bad listen address: {}", err))?,
        store: MeasurementStore::new(db_path, DEFAULT_QUERY_LIMIT),
        sites: vec![SITE.to_owned(), OTHER_SITE.to_owned()],
    };
    spawn_server(config, &shutdown_tx)
        .await
        .map_err(|err| format!("spawn server failed: {}", err))
}

async fn get(url: &str) -> Result<(u16, String), String> {
    let response = reqwest::get(url)
        .await
        .map_err(|err| format!("request to {} failed: {}", url, err))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|err| format!("read body failed: {}", err))?;
    Ok((status, body))
}

#[test]
fn e2e_data_endpoint_matches_substrings() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let db_path = dir.path().join("sitemonitor.db");
        create_store(&db_path, &three_hours_of_rows())?;
        let server = start_server(db_path).await?;
        let base = format!("http://{}", server.local_addr());

        let client = ApiClient::new(&base).map_err(|err| format!("client failed: {}", err))?;
        let rows: Vec<Measurement> = client
            .fetch("alpha.example")
            .await
            .map_err(|err| format!("fetch failed: {}", err))?;
        if rows.len() != 25 || rows.iter().any(|row| row.site != SITE) {
            return Err(format!("Unexpected rows: {}", rows.len()));
        }

        let none = client
            .fetch("nobody.example")
            .await
            .map_err(|err| format!("fetch failed: {}", err))?;
        if !none.is_empty() {
            return Err("Expected no rows for unknown site".to_owned());
        }

        server.stop().await.map_err(|err| format!("stop failed: {}", err))
    })
}

#[test]
fn e2e_missing_store_returns_error_payload() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let server = start_server(dir.path().join("absent.db")).await?;
        let url = format!("http://{}/api/data/alpha.example", server.local_addr());

        let (status, body) = get(&url).await?;
        if status != 500 {
            return Err(format!("Expected 500, got {}", status));
        }
        let payload: ErrorPayload =
            serde_json::from_str(&body).map_err(|err| format!("bad payload {}: {}", body, err))?;
        if payload.error != "Database file not found" || payload.db_path.is_none() {
            return Err(format!("Unexpected payload: {}", body));
        }

        let client = ApiClient::new(&format!("http://{}", server.local_addr()))
            .map_err(|err| format!("client failed: {}", err))?;
        if client.fetch("alpha.example").await.is_ok() {
            return Err("Expected client fetch to fail".to_owned());
        }

        server.stop().await.map_err(|err| format!("stop failed: {}", err))
    })
}

#[test]
fn e2e_broken_schema_returns_query_failure() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let db_path = dir.path().join("legacy.db");
        let conn =
            rusqlite::Connection::open(&db_path).map_err(|err| format!("open db failed: {}", err))?;
        conn.execute_batch("CREATE TABLE measurements (website TEXT, timestamp DATETIME);")
            .map_err(|err| format!("create table failed: {}", err))?;
        drop(conn);
        let server = start_server(db_path).await?;
        let url = format!("http://{}/api/data/alpha.example", server.local_addr());

        let (status, body) = get(&url).await?;
        if status != 500 {
            return Err(format!("Expected 500, got {}", status));
        }
        let payload: ErrorPayload =
            serde_json::from_str(&body).map_err(|err| format!("bad payload {}: {}", body, err))?;
        if payload.error != "Query execution failed" || payload.details.is_none() {
            return Err(format!("Unexpected payload: {}", body));
        }

        server.stop().await.map_err(|err| format!("stop failed: {}", err))
    })
}

#[test]
fn e2e_auxiliary_routes() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let db_path = dir.path().join("sitemonitor.db");
        create_store(&db_path, &three_hours_of_rows())?;
        let server = start_server(db_path).await?;
        let base = format!("http://{}", server.local_addr());

        let (status, body) = get(&format!("{}/health", base)).await?;
        if status != 200 || body != r#"{"status":"ok"}"# {
            return Err(format!("Unexpected health response: {} {}", status, body));
        }

        let (status, body) = get(&format!("{}/api/sites", base)).await?;
        let sites: Vec<String> =
            serde_json::from_str(&body).map_err(|err| format!("bad sites {}: {}", body, err))?;
        if status != 200 || sites != [SITE, OTHER_SITE] {
            return Err(format!("Unexpected sites: {}", body));
        }

        let (status, body) = get(&format!("{}/api/averages/monthly", base)).await?;
        let averages: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&body).map_err(|err| format!("bad averages {}: {}", body, err))?;
        if status != 200 || !averages.contains_key(SITE) || !averages.contains_key(OTHER_SITE) {
            return Err(format!("Unexpected averages: {} {}", status, body));
        }

        let (status, _) = get(&format!("{}/api/nothing", base)).await?;
        if status != 404 {
            return Err(format!("Expected 404, got {}", status));
        }
        let (status, _) = get(&format!("{}/api/averages/yearly", base)).await?;
        if status != 400 {
            return Err(format!("Expected 400, got {}", status));
        }

        let response = reqwest::Client::new()
            .post(format!("{}/api/sites", base))
            .send()
            .await
            .map_err(|err| format!("post failed: {}", err))?;
        if response.status().as_u16() != 405 {
            return Err(format!("Expected 405, got {}", response.status()));
        }

        server.stop().await.map_err(|err| format!("stop failed: {}", err))
    })
}

#[test]
fn e2e_dashboard_refresh_buckets_last_three_hours() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let db_path = dir.path().join("sitemonitor.db");
        create_store(&db_path, &three_hours_of_rows())?;
        let server = start_server(db_path).await?;
        let client = ApiClient::new(&format!("http://{}", server.local_addr()))
            .map_err(|err| format!("client failed: {}", err))?;

        let session = DashboardSession::new(vec![SITE.to_owned()], Granularity::Daily, false);
        let session = refresh(session, &client, RefreshTrigger::Initial, fixed_now).await;
        let series = session
            .series_at(0)
            .ok_or_else(|| "Expected a loaded series".to_owned())?;

        if series.fetch_failed || series.points.len() != 24 {
            return Err(format!("Unexpected series shape: {}", series.points.len()));
        }
        let populated: Vec<(&str, Option<f64>, Option<f64>)> = series
            .points
            .iter()
            .filter(|point| point.ttfb.is_some())
            .map(|point| (point.label.as_str(), point.ttfb, point.loading_delay))
            .collect();
        let expected = vec![
            ("11:00", Some(0.25), Some(1.5)),
            ("12:00", Some(0.5), Some(2.0)),
            ("13:00", Some(0.75), Some(2.5)),
        ];
        if populated != expected {
            return Err(format!("Unexpected populated buckets: {:?}", populated));
        }
        let absent = series
            .points
            .iter()
            .filter(|point| point.ttfb.is_none() && point.loading_delay.is_none())
            .count();
        if absent != 21 {
            return Err(format!("Expected 21 absent buckets, got {}", absent));
        }

        server.stop().await.map_err(|err| format!("stop failed: {}", err))
    })
}
