//! Endpoint rotation across Piped mirrors.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tunebridge_lib::piped::{EndpointPool, PipedClient, PipedProvider};
use tunebridge_lib::{CatalogProvider, ProviderError, ProviderKind, ProviderManager};

const SEARCH_FIXTURE: &str = include_str!("fixtures/piped_search.json");
const STREAMS_FIXTURE: &str = include_str!("fixtures/piped_streams.json");

fn fixture(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap()
}

async fn mirrors(n: usize) -> Vec<MockServer> {
    let mut servers = Vec::with_capacity(n);
    for _ in 0..n {
        servers.push(MockServer::start().await);
    }
    servers
}

fn provider_for(servers: &[MockServer], timeout_secs: u64) -> PipedProvider {
    let pool = EndpointPool::with_cursor(servers.iter().map(|s| s.uri()).collect(), 0);
    let client = PipedClient::with_pool(pool, timeout_secs).unwrap();
    PipedProvider::with_client(client, "US")
}

#[tokio::test]
async fn test_all_mirrors_fail_after_exactly_k_attempts() {
    let servers = mirrors(3).await;
    for server in &servers {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(server)
            .await;
    }

    let provider = provider_for(&servers, 5);
    let result = provider.search("despacito", 10).await;

    assert!(matches!(
        result,
        Err(ProviderError::AllEndpointsFailed { attempts: 3 })
    ));
    // Every attempt advanced the cursor, so it is back where it started.
    assert_eq!(provider.client().pool().cursor(), 0);
}

#[tokio::test]
async fn test_rotates_past_bad_mirrors() {
    let servers = mirrors(3).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&servers[0])
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&servers[1])
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "despacito"))
        .and(query_param("filter", "music_songs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(SEARCH_FIXTURE)))
        .expect(1)
        .mount(&servers[2])
        .await;

    let provider = provider_for(&servers, 5);
    let tracks = provider.search("despacito", 10).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "piped:kJQP7kiw5Fk");
    assert_eq!(tracks[0].artist, "Luis Fonsi");
    assert_eq!(tracks[0].duration_ms, 282_000);
}

#[tokio::test]
async fn test_consecutive_requests_spread_across_mirrors() {
    let servers = mirrors(2).await;
    for server in &servers {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture(SEARCH_FIXTURE)))
            .expect(1)
            .mount(server)
            .await;
    }

    let provider = provider_for(&servers, 5);
    assert!(!provider.search("a", 5).await.unwrap().is_empty());
    assert!(!provider.search("b", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_timeout_counts_as_mirror_failure() {
    let servers = mirrors(2).await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&servers[0])
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .and(query_param("region", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(SEARCH_FIXTURE)["items"].clone()))
        .expect(1)
        .mount(&servers[1])
        .await;

    let provider = provider_for(&servers, 1);
    let tracks = provider.get_trending(10).await.unwrap();
    assert_eq!(tracks.len(), 2);
}

#[tokio::test]
async fn test_manager_lets_rotation_outlast_its_timeout() {
    let servers = mirrors(5).await;
    for server in &servers[..4] {
        Mock::given(method("GET"))
            .and(path("/streams/kJQP7kiw5Fk"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(fixture(STREAMS_FIXTURE))
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/streams/kJQP7kiw5Fk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(STREAMS_FIXTURE)))
        .expect(1)
        .mount(&servers[4])
        .await;

    // Four 1s mirror timeouts add up to more than the manager's 2s.
    let manager = ProviderManager::new(Duration::from_secs(2));
    manager.register_provider(Arc::new(provider_for(&servers, 1)));

    let info = manager
        .resolve_stream(ProviderKind::Piped, "piped:kJQP7kiw5Fk")
        .await
        .unwrap();
    assert_eq!(info.url, "https://pipedproxy.example/videoplayback?itag=251");

    let provider = manager.get_provider(ProviderKind::Piped).unwrap();
    assert_eq!(provider.max_call_duration(), Some(Duration::from_secs(5)));
}

#[tokio::test]
async fn test_stream_picks_best_audio_and_rotates_on_no_audio() {
    let servers = mirrors(2).await;
    Mock::given(method("GET"))
        .and(path("/streams/kJQP7kiw5Fk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audioStreams": [],
            "videoStreams": [{"url": "https://v.example/18", "mimeType": "video/mp4", "bitrate": 500000}]
        })))
        .expect(1)
        .mount(&servers[0])
        .await;
    Mock::given(method("GET"))
        .and(path("/streams/kJQP7kiw5Fk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(STREAMS_FIXTURE)))
        .expect(1)
        .mount(&servers[1])
        .await;

    let provider = provider_for(&servers, 5);
    let info = provider.get_stream_url("piped:kJQP7kiw5Fk").await.unwrap();

    assert_eq!(info.url, "https://pipedproxy.example/videoplayback?itag=251");
    assert_eq!(info.mime_type.as_deref(), Some("audio/webm"));
    assert_eq!(info.bitrate, Some(160_000));
}

#[tokio::test]
async fn test_related_excludes_seed_and_non_streams() {
    let servers = mirrors(1).await;
    Mock::given(method("GET"))
        .and(path("/streams/kJQP7kiw5Fk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(STREAMS_FIXTURE)))
        .mount(&servers[0])
        .await;

    let provider = provider_for(&servers, 5);
    let related = provider.get_related("kJQP7kiw5Fk", 10).await.unwrap();

    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, "piped:CTFtOOh47oo");
    assert_eq!(related[0].title, "Échame La Culpa");
}

#[tokio::test]
async fn test_foreign_id_rejected_without_requests() {
    let servers = mirrors(1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servers[0])
        .await;

    let provider = provider_for(&servers, 5);
    assert!(matches!(
        provider.get_stream_url("ytm:kJQP7kiw5Fk").await,
        Err(ProviderError::InvalidId(_))
    ));
}
