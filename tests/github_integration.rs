//! GitHub contents API integration tests.
//!
//! Runs the blocking client against a `wiremock` server. Clients are built,
//! used and dropped on the blocking pool, since a blocking reqwest client owns
//! a runtime that must not be dropped from async code.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::json;
use stacknotes::Error;
use stacknotes::github::{ContentsApi, GitHubClient, StackFetcher, StackSource};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = "application/vnd.github.v3+json";
const RAW: &str = "application/vnd.github.v3.raw";

fn client(uri: String) -> GitHubClient {
    GitHubClient::new("octo", "homelab").with_api_url(uri)
}

async fn mount_listing(server: &MockServer, dir: &str, entries: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/octo/homelab/contents{dir}")))
        .and(query_param("ref", "main"))
        .and(header("accept", LISTING))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

async fn mount_raw(server: &MockServer, file: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/octo/homelab/contents/{file}")))
        .and(query_param("ref", "main"))
        .and(header("accept", RAW))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_homelab_tree(server: &MockServer) {
    mount_listing(
        server,
        "",
        json!([
            {"type": "dir", "name": "media", "path": "media"},
            {"type": "file", "name": "README.md", "path": "README.md"},
            {"type": "dir", "name": "infra", "path": "infra"}
        ]),
    )
    .await;
    mount_listing(
        server,
        "/media",
        json!([{"type": "dir", "name": "jellyfin", "path": "media/jellyfin"}]),
    )
    .await;
    mount_listing(
        server,
        "/media/jellyfin",
        json!([
            {"type": "file", "name": "compose.yaml", "path": "media/jellyfin/compose.yaml"},
            {"type": "file", "name": ".env.example", "path": "media/jellyfin/.env.example"}
        ]),
    )
    .await;
    mount_listing(
        server,
        "/infra",
        json!([
            {"type": "file", "name": "docker-compose.yaml", "path": "infra/docker-compose.yaml"},
            {"type": "symlink", "name": "current", "path": "infra/current"}
        ]),
    )
    .await;
    mount_raw(
        server,
        "media/jellyfin/compose.yaml",
        "services:\n  jellyfin:\n    image: jellyfin/jellyfin\n",
    )
    .await;
    mount_raw(
        server,
        "infra/docker-compose.yaml",
        "services:\n  traefik:\n    image: traefik:v3\n",
    )
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_all_stacks_walks_the_tree() {
    let server = MockServer::start().await;
    mount_homelab_tree(&server).await;
    let uri = server.uri();

    let stacks = tokio::task::spawn_blocking(move || {
        let client = client(uri);
        StackFetcher::new(&client).fetch_all_stacks()
    })
    .await
    .unwrap()
    .unwrap();

    let names: Vec<&str> = stacks.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["infra", "jellyfin"]);
    assert_eq!(
        stacks[1].content,
        "services:\n  jellyfin:\n    image: jellyfin/jellyfin\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_carry_user_agent_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/homelab/contents/apps/compose.yaml"))
        .and(query_param("ref", "develop"))
        .and(header("user-agent", "stacknotes"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("accept", RAW))
        .respond_with(ResponseTemplate::new(200).set_body_string("services: {}\n"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let text = tokio::task::spawn_blocking(move || {
        client(uri)
            .with_ref("develop")
            .with_token("ghp_test")
            .fetch_raw("apps/compose.yaml")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(text, "services: {}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_anonymous_requests_send_no_authorization() {
    let server = MockServer::start().await;
    mount_listing(&server, "", json!([])).await;

    let uri = server.uri();
    let entries = tokio::task::spawn_blocking(move || client(uri).list_dir(""))
        .await
        .unwrap()
        .unwrap();
    assert!(entries.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let client = client(uri);
        StackFetcher::new(&client).fetch_all_stacks()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(
        matches!(&err, Error::Transport { status: 404, text } if text == "Not Found"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_file_fetch_fails_the_whole_fetch() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "",
        json!([{"type": "file", "name": "compose.yaml", "path": "gitea/compose.yaml"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/homelab/contents/gitea/compose.yaml"))
        .and(header("accept", RAW))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let client = client(uri);
        StackFetcher::new(&client).fetch_all_stacks()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, Error::Transport { status: 500, .. }));
}
