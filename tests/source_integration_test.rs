use anyhow::Result;
use httpmock::prelude::*;
use mesh_nodes::core::SourceSpec;
use mesh_nodes::core::table::HIGHLIGHT_START;
use mesh_nodes::{build_source, AppConfig, MeshError, NodeTableEngine};
use tempfile::TempDir;

fn sample_nodes() -> serde_json::Value {
    serde_json::json!({
        "nodesByNum": {
            "2882400001": {
                "num": 2882400001u64,
                "user": {
                    "id": "!abcdef01",
                    "longName": "Colle Base 📡",
                    "shortName": "CB",
                    "hwModel": "TBEAM"
                },
                "position": {"latitude": 43.7696, "longitude": 11.2558},
                "snr": 9.25,
                "lastHeard": 1700000000,
                "hopsAway": 0,
                "tags": ["città", "roof"]
            },
            "2882400002": {
                "num": 2882400002u64,
                "user": {"id": "!abcdef02", "shortName": "RX"},
                "lastHeard": 1690000000,
                "hopsAway": 3
            }
        }
    })
}

#[tokio::test]
async fn test_file_source_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nodes.json");
    tokio::fs::write(&path, serde_json::to_vec(&sample_nodes())?).await?;

    let config = AppConfig {
        source: Some(SourceSpec::File {
            path: path.to_string_lossy().into_owned(),
        }),
        utc: true,
        compact: false,
        ..Default::default()
    };

    let engine = NodeTableEngine::from_config(build_source(&config)?, &config);
    let mut out = Vec::new();
    let rows = engine.run(&mut out).await?;
    let output = String::from_utf8(out)?;

    assert_eq!(rows, 2);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("tags"));
    assert!(lines[2].starts_with(HIGHLIGHT_START));
    assert!(lines[2].contains(r#"["città","roof"]"#));
    assert!(lines[2].contains("Colle Base"));
    assert!(lines[3].contains("RX"));
    Ok(())
}

#[tokio::test]
async fn test_http_source_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/json/nodes");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(sample_nodes());
    });

    let config = AppConfig {
        source: Some(SourceSpec::Http {
            endpoint: server.url("/json/nodes"),
        }),
        utc: true,
        sort_by_hops: true,
        highlight: false,
        ..Default::default()
    };

    let engine = NodeTableEngine::from_config(build_source(&config)?, &config);
    let mut out = Vec::new();
    engine.run(&mut out).await?;
    let output = String::from_utf8(out)?;

    api_mock.assert();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].contains("!abcdef01"));
    assert!(lines[3].contains("!abcdef02"));
    assert!(!output.contains('\x1b'));
    Ok(())
}

#[tokio::test]
async fn test_http_failure_surfaces_as_api_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/json/nodes");
        then.status(500);
    });

    let config = AppConfig {
        source: Some(SourceSpec::Http {
            endpoint: server.url("/json/nodes"),
        }),
        ..Default::default()
    };

    let engine = NodeTableEngine::from_config(build_source(&config)?, &config);
    let mut out = Vec::new();
    let result = engine.run(&mut out).await;

    assert!(matches!(result, Err(MeshError::ApiError(_))));
    assert!(out.is_empty());
    Ok(())
}
