//! Integration tests using mock HTTP servers
//!
//! Tests the end-to-end flows: CLI commands → ecobee token endpoints, and
//! runtime report → NDJSON archive → Elasticsearch bulk ingest.

use chrono::NaiveDate;
use clap::Parser;
use elastibee::cli::{Cli, Runner};
use elastibee::ecobee::EcobeeClient;
use elastibee::engine::{ArchiveConfig, ArchiveEngine};
use elastibee::output::{ArchiveWriter, ElasticClient};
use elastibee::partition::DateWindowRouter;
use elastibee::state::{AppContext, CredentialStore};
use elastibee::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn write_credentials(dir: &Path, ctx: &AppContext) -> std::path::PathBuf {
    let path = dir.join("app.json");
    std::fs::write(&path, serde_json::to_string(ctx).unwrap()).unwrap();
    path
}

fn write_config(dir: &Path, api_base: &str, credentials: &Path) -> std::path::PathBuf {
    let path = dir.join("elastibee.yaml");
    let yaml = format!(
        "ecobee:\n  api_base: {api_base}\n  credentials: {}\n",
        credentials.display()
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

fn runner(config: &Path, command: &[&str]) -> Runner {
    let mut args: Vec<OsString> = vec!["elastibee".into(), "--config".into(), config.into()];
    args.extend(command.iter().map(OsString::from));
    Runner::new(Cli::parse_from(args))
}

fn read_credentials(path: &Path) -> AppContext {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ============================================================================
// CLI Token Flows
// ============================================================================

#[tokio::test]
async fn test_token_command_stores_tokens() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("grant_type", "ecobeePin"))
        .and(query_param("code", "auth-code"))
        .and(query_param("client_id", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": 3599,
            "refresh_token": "refresh-1",
            "scope": "smartWrite"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creds = write_credentials(dir.path(), &AppContext::new("app-key"));
    let config = write_config(dir.path(), &server.uri(), &creds);

    runner(&config, &["token", "auth-code"]).run().await.unwrap();

    let stored = read_credentials(&creds);
    assert_eq!(stored.app_key, "app-key");
    assert_eq!(stored.access_token, "access-1");
    assert_eq!(stored.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_token_command_pending_authorization() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": "Waiting for user to authorize application.",
            "error_uri": "https://tools.ietf.org/html/rfc6749#section-5.2"
        })))
        .mount(&server)
        .await;

    let creds = write_credentials(dir.path(), &AppContext::new("app-key"));
    let config = write_config(dir.path(), &server.uri(), &creds);

    let err = runner(&config, &["token", "auth-code"])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert!(err.to_string().contains("authorization_pending"));
    assert!(!read_credentials(&creds).has_tokens());
}

#[tokio::test]
async fn test_refresh_command_rotates_tokens() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(query_param("refresh_token", "refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "token_type": "Bearer",
            "expires_in": 3599,
            "refresh_token": "refresh-2",
            "scope": "smartWrite"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctx = AppContext::new("app-key");
    ctx.set_tokens("access-1", "refresh-1");
    ctx.thermostats = vec!["411111111111".to_string()];
    let creds = write_credentials(dir.path(), &ctx);
    let config = write_config(dir.path(), &server.uri(), &creds);

    runner(&config, &["refresh"]).run().await.unwrap();

    let stored = read_credentials(&creds);
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token, "refresh-2");
    assert_eq!(stored.thermostats, vec!["411111111111".to_string()]);
}

// ============================================================================
// Archive Flow
// ============================================================================

#[tokio::test]
async fn test_archive_flow_into_elasticsearch() {
    let ecobee = MockServer::start().await;
    let elastic = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "thermostatList": [{"identifier": "411111111111", "name": "Main Floor"}],
            "status": {"code": 0, "message": ""}
        })))
        .expect(1)
        .mount(&ecobee)
        .await;

    Mock::given(method("GET"))
        .and(path("/1/runtimeReport"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": "auxHeat1,zoneAveTemp,zoneHvacMode",
            "reportList": [{
                "thermostatIdentifier": "411111111111",
                "rowCount": 2,
                "rowList": [
                    "2019-01-01,00:00:00,0,70.5,heat",
                    "2019-01-01,00:05:00,300,70.1,heat"
                ]
            }],
            "sensorList": [{
                "thermostatIdentifier": "411111111111",
                "sensors": [
                    {"sensorId": "rs1:temperature", "sensorName": "Bedroom", "sensorType": "temperature", "sensorUsage": "monitor"},
                    {"sensorId": "rs1:occupancy", "sensorName": "Bedroom", "sensorType": "occupancy", "sensorUsage": "monitor"}
                ],
                "columns": ["date", "time", "rs1:temperature", "rs1:occupancy"],
                "data": ["2019-01-01,00:00:00,68.2,0"]
            }],
            "status": {"code": 0, "message": ""}
        })))
        .expect(2)
        .mount(&ecobee)
        .await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&elastic)
        .await;

    Mock::given(method("PUT"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&elastic)
        .await;

    Mock::given(method("POST"))
        .and(path("/eco/_bulk"))
        .and(header("Content-Type", "application/x-ndjson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 4,
            "errors": false,
            "items": [{}, {}, {}, {}]
        })))
        .expect(2)
        .mount(&elastic)
        .await;

    let mapping = dir.path().join("mapping.json");
    std::fs::write(&mapping, r#"{"mappings":{"properties":{}}}"#).unwrap();

    let mut ctx = AppContext::new("app-key");
    ctx.set_tokens("access-1", "refresh-1");
    let creds = write_credentials(dir.path(), &ctx);
    let store = CredentialStore::new(&creds);

    let client = EcobeeClient::new(
        &ecobee.uri(),
        "app-key",
        Duration::from_secs(5),
        Duration::from_secs(5),
        store,
    )
    .unwrap();
    let sink = ElasticClient::new(&elastic.uri(), Duration::from_secs(5)).unwrap();
    let archive_dir = dir.path().join("archive");

    let config = ArchiveConfig::new()
        .with_mapping(&mapping)
        .with_pause(Duration::ZERO);
    let mut engine =
        ArchiveEngine::new(client, sink, ArchiveWriter::new(&archive_dir)).with_config(config);

    let windows = DateWindowRouter::new(date("2019-01-01"), date("2019-01-31"), 20)
        .unwrap()
        .windows();
    let stats = engine.run(&mut ctx, &windows).await.unwrap();

    assert_eq!(stats.windows, 2);
    assert_eq!(stats.thermostat_records, 4);
    assert_eq!(stats.sensor_records, 4);
    assert_eq!(stats.bulk_failures, 0);
    assert!(stats.index_created);

    // Thermostat ids were discovered and cached
    assert_eq!(ctx.thermostats, vec!["411111111111".to_string()]);
    assert_eq!(read_credentials(&creds).thermostats, ctx.thermostats);

    let first = std::fs::read_to_string(archive_dir.join("20190101-20190120.json")).unwrap();
    let lines: Vec<serde_json::Value> = first
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], json!({"index": {}}));
    assert_eq!(lines[1]["type"], "thermostat");
    assert_eq!(lines[1]["@timestamp"], "2019-01-01T00:00:00");
    assert_eq!(lines[3]["auxHeat1"], 300);
    assert_eq!(lines[5]["type"], "sensor");
    assert_eq!(lines[5]["temperature"], 68.2);
    assert_eq!(lines[7]["occupancy"], false);

    assert!(archive_dir.join("20190121-20190209.json").exists());
}

#[tokio::test]
async fn test_archive_flow_rejected_bulk_stops_run() {
    let ecobee = MockServer::start().await;
    let elastic = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/1/runtimeReport"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": "zoneAveTemp",
            "reportList": [{
                "thermostatIdentifier": "411111111111",
                "rowCount": 1,
                "rowList": ["2019-01-01,00:00:00,70.5"]
            }],
            "sensorList": [],
            "status": {"code": 0, "message": ""}
        })))
        .expect(1)
        .mount(&ecobee)
        .await;

    Mock::given(method("GET"))
        .and(path("/eco"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eco": {}})))
        .mount(&elastic)
        .await;

    Mock::given(method("POST"))
        .and(path("/eco/_bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad bulk body"))
        .mount(&elastic)
        .await;

    let mut ctx = AppContext::new("app-key");
    ctx.set_tokens("access-1", "refresh-1");
    ctx.thermostats = vec!["411111111111".to_string()];
    let creds = write_credentials(dir.path(), &ctx);

    let client = EcobeeClient::new(
        &ecobee.uri(),
        "app-key",
        Duration::from_secs(5),
        Duration::from_secs(5),
        CredentialStore::new(&creds),
    )
    .unwrap();
    let sink = ElasticClient::new(&elastic.uri(), Duration::from_secs(5)).unwrap();
    let archive_dir = dir.path().join("archive");
    let mut engine = ArchiveEngine::new(client, sink, ArchiveWriter::new(&archive_dir))
        .with_config(ArchiveConfig::new().with_pause(Duration::ZERO));

    let windows = DateWindowRouter::new(date("2019-01-01"), date("2019-01-31"), 20)
        .unwrap()
        .windows();
    let err = engine.run(&mut ctx, &windows).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
    assert_eq!(engine.stats().windows, 0);
    // Archive is written before sending
    assert!(archive_dir.join("20190101-20190120.json").exists());
}
