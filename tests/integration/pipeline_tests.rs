//! Integration tests for the strip and feed pipeline
//!
//! A wiremock server stands in for the strip site; the object store is the
//! in-memory implementation so the tests can inspect what was written.

use dilbert_feed::config::{parse_config, Config};
use dilbert_feed::feed::gen_feed;
use dilbert_feed::storage::{MemoryStore, ObjectStore};
use dilbert_feed::strip::get_strip;
use dilbert_feed::{with_deadline, ErrorKind};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLIC_URL: &str = "https://dilbert-feed-test.s3.amazonaws.com";
const IMAGE_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

fn create_test_config(base_url: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
base-url = "{base_url}"
timeout-secs = 5

[storage]
bucket = "dilbert-feed-test"
strips-dir = "strips/"

[feed]
path = "v0/rss.xml"
length = 3
"#
    ))
    .expect("Failed to parse test config")
}

/// Serves `fixture` as the strip page for `date`, with asset URLs rewritten
/// to point at the mock server
async fn mount_strip_page(server: &MockServer, date: &str, fixture: &str) {
    let html = fixture.replace("https://assets.amuniversal.com", &server.uri());

    Mock::given(method("GET"))
        .and(path(format!("/strip/{}", date)))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_strip_title_survives_into_feed() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let store = Arc::new(MemoryStore::new(PUBLIC_URL));

    mount_strip_page(
        &server,
        "2020-11-11",
        include_str!("../fixtures/strip-2020-11-11.html"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/f25312c0fb5b01382ef9005056a9545d"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/gif")
                .set_body_bytes(IMAGE_BYTES),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = get_strip(&config, store.clone(), Some("2020-11-11"))
        .await
        .expect("get-strip should succeed");

    assert_eq!(output.comic.date, "2020-11-11");
    assert_eq!(output.comic.title, "Elbonian Words");
    assert_eq!(
        output.upload_url,
        format!("{}/strips/2020-11-11.gif", PUBLIC_URL)
    );

    let object = store
        .get("strips/2020-11-11.gif")
        .await
        .expect("Strip should be stored");
    assert_eq!(object.body.as_ref(), IMAGE_BYTES);
    assert_eq!(object.content_type, "image/gif");

    let metadata = store
        .head_metadata("strips/2020-11-11.gif")
        .await
        .expect("Metadata should be readable");
    assert_eq!(metadata.get("Title").map(String::as_str), Some("Elbonian Words"));

    // Feed window: 2020-11-12, 2020-11-11, 2020-11-10
    let feed = gen_feed(&config, store.clone(), Some("2020-11-12"))
        .await
        .expect("gen-feed should succeed");

    assert_eq!(feed.feed_url, format!("{}/v0/rss.xml", PUBLIC_URL));
    assert_eq!(feed.items, 3);

    let document = store.get("v0/rss.xml").await.expect("Feed should be stored");
    let xml = String::from_utf8(document.body.to_vec()).expect("Feed should be UTF-8");

    let newest = xml
        .find("<title>Dilbert - 2020-11-12</title>")
        .expect("Missing strip should get a date title");
    let stored = xml
        .find("<title>Elbonian Words</title>")
        .expect("Stored title should be recovered");
    let oldest = xml
        .find("<title>Dilbert - 2020-11-10</title>")
        .expect("Missing strip should get a date title");
    assert!(newest < stored && stored < oldest);

    assert!(xml.contains(&format!(
        "<guid>{}/strips/2020-11-11.gif</guid>",
        PUBLIC_URL
    )));
    assert!(xml.contains("<pubDate>Wed, 11 Nov 2020 00:00:00 +0000</pubDate>"));
}

#[tokio::test]
async fn test_legacy_markup_is_mirrored() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let store = Arc::new(MemoryStore::new(PUBLIC_URL));

    mount_strip_page(
        &server,
        "2018-10-30",
        include_str!("../fixtures/strip-2018-10-30.html"),
    )
    .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(IMAGE_BYTES))
        .mount(&server)
        .await;

    let output = get_strip(&config, store.clone(), Some("2018-10-30"))
        .await
        .expect("get-strip should succeed");

    assert_eq!(output.comic.title, "Intentionally Underbidding");
    assert_eq!(store.keys().await, vec!["strips/2018-10-30.gif".to_string()]);
}

#[tokio::test]
async fn test_missing_image_stores_nothing() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let store = Arc::new(MemoryStore::new(PUBLIC_URL));

    mount_strip_page(
        &server,
        "2019-02-07",
        include_str!("../fixtures/strip-no-image.html"),
    )
    .await;

    let err = get_strip(&config, store.clone(), Some("2019-02-07"))
        .await
        .expect_err("A page without an image URL must fail");

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("image URL not found"));
    assert!(store.keys().await.is_empty());
}

#[tokio::test]
async fn test_image_fetch_failure_stores_nothing() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let store = Arc::new(MemoryStore::new(PUBLIC_URL));

    mount_strip_page(
        &server,
        "2020-11-11",
        include_str!("../fixtures/strip-2020-11-11.html"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/f25312c0fb5b01382ef9005056a9545d"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = get_strip(&config, store.clone(), Some("2020-11-11"))
        .await
        .expect_err("A missing image must fail");

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(store.keys().await.is_empty());
}

#[tokio::test]
async fn test_slow_site_hits_deadline() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let store = Arc::new(MemoryStore::new(PUBLIC_URL));

    Mock::given(method("GET"))
        .and(path("/strip/2020-11-11"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = with_deadline(
        Duration::from_millis(200),
        get_strip(&config, store.clone(), Some("2020-11-11")),
    )
    .await
    .expect_err("The invocation should be cut off");

    assert_eq!(err.kind(), ErrorKind::Deadline);
    assert!(store.keys().await.is_empty());
}
