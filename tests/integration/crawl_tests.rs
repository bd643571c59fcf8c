//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full download cycle end-to-end.

use std::fs;
use std::path::PathBuf;
use sumi_mirror::config::Config;
use sumi_mirror::state::{TargetKind, TargetState};
use sumi_mirror::{mirror_site, Coordinator};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `output`
///
/// Pages are fetched with plain HTTP, links are not probed for redirects
/// and no ignore patterns apply.
fn create_test_config(output: &TempDir) -> Config {
    let mut config = Config::default();
    config.mirror.output_dir = output.path().to_path_buf();
    config.mirror.render = false;
    config.mirror.follow_redirects = false;
    config.fetch.request_timeout_secs = 5;
    config.ignore.patterns.clear();
    config
}

/// Directory the mock server's files are mirrored into
fn host_dir(output: &TempDir, server: &MockServer) -> PathBuf {
    let uri = Url::parse(&server.uri()).unwrap();
    output.path().join(format!(
        "{}:{}",
        uri.host_str().unwrap(),
        uri.port().unwrap()
    ))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, at: &str, body: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_with_assets() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a>
           <img src="/img/logo.png">
           <link rel="stylesheet" href="/css/site.css">"#,
        1,
    )
    .await;
    mount_page(&server, "/about", "<p>About us</p>", 1).await;

    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/css/site.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("@font-face { src: url(fonts/a.woff); }")
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/css/fonts/a.woff"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"wOFF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let stats = mirror_site(create_test_config(&output), &seed)
        .await
        .expect("mirror failed");

    let host = host_dir(&output, &server);
    assert!(host.join("index.html").is_file());
    assert!(host.join("about/index.html").is_file());
    assert_eq!(
        fs::read(host.join("img/logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    assert!(host.join("css/site.css").is_file());
    assert_eq!(fs::read(host.join("css/fonts/a.woff")).unwrap(), b"wOFF");

    assert_eq!(stats.downloads(), 5);
    assert_eq!(stats.saved(TargetKind::Page), 2);
    assert_eq!(stats.saved(TargetKind::Asset), 3);
    assert!(!stats.interrupted);
}

#[tokio::test]
async fn test_no_assets_saves_pages_only() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<img src="/logo.png"><a href="/next">Next</a>"#, 1).await;
    mount_page(&server, "/next", "<p>next</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&output);
    config.mirror.include_assets = false;

    let stats = mirror_site(config, &server.uri()).await.unwrap();

    assert_eq!(stats.downloads(), 2);
    assert!(!host_dir(&output, &server).join("logo.png").exists());
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/a#x">A</a><a href="/a#y">A again</a><a href="/a">A plain</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", r##"<a href="/#top">Home</a>"##, 1).await;

    let mut coordinator = Coordinator::new(create_test_config(&output), &server.uri())
        .await
        .unwrap();
    coordinator.run().await;

    let visited: Vec<&str> = coordinator.visited().iter().collect();
    assert_eq!(visited.len(), 2);
    assert!(visited.iter().all(|url| !url.contains('#')));
}

#[tokio::test]
async fn test_ignored_url_never_fetched() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><img src="/private/pixel.gif?id=7">"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/pixel.gif"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&output);
    config.ignore.patterns = vec!["*/private/*".to_string()];

    let mut coordinator = Coordinator::new(config, &server.uri()).await.unwrap();
    coordinator.run().await;

    let secret = Url::parse(&format!("{}/private/secret", server.uri())).unwrap();
    assert!(!coordinator.visited().contains(&secret));
    assert_eq!(coordinator.visited().len(), 1);
    assert_eq!(coordinator.stats().count(TargetState::Ignored), 2);
    assert!(!host_dir(&output, &server).join("private").exists());
}

#[tokio::test]
async fn test_other_host_never_crawled() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/elsewhere">Elsewhere</a>"#, other.uri()),
        1,
    )
    .await;
    mount_page(&other, "/elsewhere", "<p>not ours</p>", 0).await;

    let stats = mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    assert_eq!(stats.downloads(), 1);
    assert!(!host_dir(&output, &other).exists());
}

#[tokio::test]
async fn test_same_domain_assets_restricts_assets() {
    let server = MockServer::start().await;
    let cdn = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        &format!(r#"<script src="{}/lib.js"></script>"#, cdn.uri()),
        2,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/lib.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("let x;"))
        .expect(1)
        .mount(&cdn)
        .await;

    // Off-site assets are fetched by default
    let first = TempDir::new().unwrap();
    mirror_site(create_test_config(&first), &server.uri())
        .await
        .unwrap();
    assert!(host_dir(&first, &cdn).join("lib.js").is_file());

    let mut config = create_test_config(&output);
    config.mirror.same_domain_assets = true;
    let stats = mirror_site(config, &server.uri()).await.unwrap();

    assert_eq!(stats.saved(TargetKind::Asset), 0);
    assert!(!host_dir(&output, &cdn).exists());
}

#[tokio::test]
async fn test_redirected_link_followed() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/old">Old</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    // The redirect target is fetched as a page without a second probe
    mount_page(&server, "/new", "<p>moved here</p>", 1).await;

    let mut config = create_test_config(&output);
    config.mirror.follow_redirects = true;

    let stats = mirror_site(config, &server.uri()).await.unwrap();

    let host = host_dir(&output, &server);
    assert!(host.join("new/index.html").is_file());
    assert!(!host.join("old").exists());
    assert_eq!(stats.saved(TargetKind::Page), 2);
}

#[tokio::test]
async fn test_broken_link_skipped_when_probing() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/gone">Gone</a><a href="/ok">Ok</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<p>ok</p>", 2).await;

    let mut config = create_test_config(&output);
    config.mirror.follow_redirects = true;

    let stats = mirror_site(config, &server.uri()).await.unwrap();

    assert_eq!(stats.saved(TargetKind::Page), 2);
    assert_eq!(stats.count(TargetState::Failed), 1);
    assert!(!host_dir(&output, &server).join("gone").exists());
}

#[tokio::test]
async fn test_failed_asset_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<img src="/missing.png"><img src="/present.png"><a href="/next">Next</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/next", "<p>still crawled</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/present.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let stats = mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let host = host_dir(&output, &server);
    assert!(!host.join("missing.png").exists());
    assert!(host.join("present.png").is_file());
    assert!(host.join("next/index.html").is_file());
    assert_eq!(stats.count(TargetState::Failed), 1);
    assert_eq!(stats.downloads(), 3);
}

#[tokio::test]
async fn test_query_strings_get_distinct_files() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/list?page=2">2</a><a href="/list?page=3">3</a>"#,
        1,
    )
    .await;
    for page in ["2", "3"] {
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("page", page))
            .respond_with(html(&format!("<p>page {}</p>", page)))
            .expect(1)
            .mount(&server)
            .await;
    }

    mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let list = host_dir(&output, &server).join("list");
    let second = fs::read_to_string(list.join("index-page=2.html")).unwrap();
    let third = fs::read_to_string(list.join("index-page=3.html")).unwrap();
    assert!(second.contains("page 2"));
    assert!(third.contains("page 3"));
}

#[tokio::test]
async fn test_file_then_directory_keeps_both() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/v1.2">Release</a><a href="/v1.2/notes">Notes</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/v1.2", "<p>release page</p>", 1).await;
    mount_page(&server, "/v1.2/notes", "<p>release notes</p>", 1).await;

    mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let release = host_dir(&output, &server).join("v1.2");
    assert!(release.is_dir());
    assert!(fs::read_to_string(release.join("index.html"))
        .unwrap()
        .contains("release page"));
    assert!(fs::read_to_string(release.join("notes/index.html"))
        .unwrap()
        .contains("release notes"));
}

#[tokio::test]
async fn test_directory_then_file_lands_in_index() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/v1.2/notes">Notes</a><a href="/v1.2">Release</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/v1.2/notes", "<p>release notes</p>", 1).await;
    mount_page(&server, "/v1.2", "<p>release page</p>", 1).await;

    mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let release = host_dir(&output, &server).join("v1.2");
    assert!(release.is_dir());
    assert!(fs::read_to_string(release.join("index.html"))
        .unwrap()
        .contains("release page"));
    assert!(release.join("notes/index.html").is_file());
}

#[tokio::test]
async fn test_download_twice_is_noop() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", "<p>home</p>", 1).await;

    let mut coordinator = Coordinator::new(create_test_config(&output), &server.uri())
        .await
        .unwrap();
    let seed = Url::parse(&format!("{}/", server.uri())).unwrap();

    assert!(coordinator.download(&seed).await);
    assert!(!coordinator.download(&seed).await);
    coordinator.close().await;

    assert_eq!(coordinator.stats().downloads(), 1);
}

#[tokio::test]
async fn test_stylesheet_imports_followed() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<style>@import "/css/base.css";</style>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/css/base.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"@import url("theme.css"); body { background: url('../img/bg.jpg') }"#)
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;
    // No CSS content type: recognized by extension
    Mock::given(method("GET"))
        .and(path("/css/theme.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string(".x { background: url(x.gif) }"))
        .expect(1)
        .mount(&server)
        .await;
    for asset in ["/img/bg.jpg", "/css/x.gif"] {
        Mock::given(method("GET"))
            .and(path(asset))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let stats = mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let host = host_dir(&output, &server);
    assert!(host.join("css/base.css").is_file());
    assert!(host.join("css/theme.css").is_file());
    assert!(host.join("css/x.gif").is_file());
    assert!(host.join("img/bg.jpg").is_file());
    assert_eq!(stats.saved(TargetKind::Asset), 4);
}

#[tokio::test]
async fn test_file_download_saved_but_not_crawled() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/doc.txt">Notes</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/doc.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/hidden">looks like a link</a>"#)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/hidden", "<p>never linked from a page</p>", 0).await;

    let stats = mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let host = host_dir(&output, &server);
    assert!(host.join("doc.txt").is_file());
    assert!(!host.join("hidden").exists());
    assert_eq!(stats.saved(TargetKind::FileDownload), 1);
    assert_eq!(stats.saved(TargetKind::Page), 1);
}

#[tokio::test]
async fn test_cyclic_stylesheets_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<link rel="stylesheet" href="/css/a.css"><link rel="stylesheet" href="/css/b.css">"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/css/a.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"@import "b.css"; .a { color: red }"#)
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/css/b.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(".b { background: url(a.css) }")
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stats = mirror_site(create_test_config(&output), &server.uri())
        .await
        .unwrap();

    let css = host_dir(&output, &server).join("css");
    assert!(css.join("a.css").is_file());
    assert!(css.join("b.css").is_file());
    assert_eq!(stats.saved(TargetKind::Asset), 2);
}

#[tokio::test]
async fn test_redirect_out_of_scope_not_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/old">Old</a><a href="/away">Away</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/private/x"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/landing", other.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/private/x", "<p>private</p>", 0).await;
    mount_page(&other, "/landing", "<p>elsewhere</p>", 0).await;

    let mut config = create_test_config(&output);
    config.mirror.follow_redirects = true;
    config.ignore.patterns = vec!["*/private/*".to_string()];

    let mut coordinator = Coordinator::new(config, &server.uri()).await.unwrap();
    coordinator.run().await;

    assert!(coordinator.visited().iter().all(|url| !url.contains("private")));
    assert!(coordinator.visited().iter().all(|url| !url.contains("landing")));
    assert_eq!(coordinator.stats().count(TargetState::Ignored), 2);
    assert_eq!(coordinator.stats().downloads(), 1);
    assert!(!host_dir(&output, &server).join("private").exists());
    assert!(!host_dir(&output, &other).exists());
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let output = TempDir::new().unwrap();
    let result = mirror_site(create_test_config(&output), "mailto:someone@example.com").await;
    assert!(result.is_err());
}
