//! Config loading and a manager built from it.

use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tunebridge_lib::{CatalogConfig, ProviderKind, ProviderManager};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_file_with_partial_sections() {
    let file = write_config(
        r#"{
            "enabled": ["saavn", "youtube"],
            "provider_timeout_secs": 12,
            "dedup_results": true,
            "piped": { "instances": ["https://pipedapi.example/"], "region": "IN" }
        }"#,
    );

    let config = CatalogConfig::load(file.path()).unwrap();

    assert_eq!(config.enabled, vec![ProviderKind::Saavn, ProviderKind::YouTube]);
    assert_eq!(config.provider_timeout().as_secs(), 12);
    assert!(config.dedup_results);
    assert_eq!(config.piped.region, "IN");
    assert!(!config.piped.discover_instances);
    // Untouched sections keep their defaults.
    assert_eq!(config.saavn.trending_playlist_id, "110858205");
    assert_eq!(config.stream.timeout_secs, 30);
}

#[test]
fn test_invalid_file_names_the_path() {
    let file = write_config("{ \"enabled\": [\"napster\"] }");
    let err = CatalogConfig::load(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains(&file.path().display().to_string()));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("config.json");
    assert!(CatalogConfig::load(&missing).is_err());
}

#[test]
fn test_roundtrip_through_file() {
    let mut config = CatalogConfig::default();
    config.enabled = vec![ProviderKind::Piped];
    config.spotify.market = "DE".to_string();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = CatalogConfig::load(&path).unwrap();
    assert_eq!(loaded.enabled, vec![ProviderKind::Piped]);
    assert_eq!(loaded.spotify.market, "DE");
}

#[tokio::test]
async fn test_manager_from_config_queries_enabled_providers_only() {
    let saavn = MockServer::start().await;
    let piped = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::from_str::<serde_json::Value>(include_str!("fixtures/saavn_search.json"))
                .unwrap(),
        ))
        .expect(1)
        .mount(&saavn)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::from_str::<serde_json::Value>(include_str!("fixtures/piped_search.json"))
                .unwrap(),
        ))
        .expect(1)
        .mount(&piped)
        .await;

    let mut config = CatalogConfig::default();
    config.enabled = vec![ProviderKind::Piped, ProviderKind::Saavn];
    config.saavn.api_base = format!("{}/api", saavn.uri());
    config.piped.instances = vec![piped.uri()];
    config.piped.discover_instances = false;
    config.youtube.api_base = "http://127.0.0.1:9".to_string();

    let manager = ProviderManager::from_config(&config).await;

    assert_eq!(manager.list_providers().len(), 4);
    assert_eq!(
        manager.enabled_providers(),
        vec![ProviderKind::Saavn, ProviderKind::Piped]
    );

    let kinds: Vec<ProviderKind> = manager
        .search("despacito", 10)
        .await
        .iter()
        .map(|t| t.provider)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ProviderKind::Saavn,
            ProviderKind::Saavn,
            ProviderKind::Piped,
            ProviderKind::Piped
        ]
    );
}
