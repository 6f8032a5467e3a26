//! Integration tests for `GitHubClient` using wiremock HTTP mocks.

use base64::Engine;
use quill_github::{FileWrite, GitHubClient, GitHubError};
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE_PATH: &str = "/repos/acme/site/contents/content/blog/deck-care.mdx";

fn test_client(api_url: &str) -> GitHubClient {
    GitHubClient::with_base_url(Some("tok".to_string()), api_url, Some("acme/site"))
        .expect("client construction should not fail")
}

fn encode(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text)
}

#[tokio::test]
async fn default_branch_is_read_from_repo() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/site"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "default_branch": "trunk" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let branch = client.default_branch().await.expect("should resolve branch");
    assert_eq!(branch, "trunk");
}

#[tokio::test]
async fn get_file_decodes_wrapped_base64() {
    let server = MockServer::start().await;

    // GitHub wraps base64 at 60 columns.
    let encoded = encode("---\ntitle: \"Deck care\"\n---\n\nOil twice a year.");
    let wrapped = format!("{}\n{}", &encoded[..20], &encoded[20..]);

    Mock::given(method("GET"))
        .and(path(FILE_PATH))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sha": "abc123",
            "content": wrapped,
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let file = client
        .get_file("content/blog/deck-care.mdx", "main")
        .await
        .expect("should fetch")
        .expect("file should exist");

    assert_eq!(file.sha, "abc123");
    assert!(file.content.ends_with("Oil twice a year."));
}

#[tokio::test]
async fn get_file_missing_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FILE_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "message": "Not Found" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let file = client
        .get_file("content/blog/deck-care.mdx", "main")
        .await
        .expect("404 is not an error");
    assert!(file.is_none());
}

#[tokio::test]
async fn put_file_sends_encoded_content_and_sha() {
    let server = MockServer::start().await;
    let body = "---\ntitle: \"Deck care\"\n---\n\nBody";

    Mock::given(method("PUT"))
        .and(path(FILE_PATH))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(serde_json::json!({
            "message": "Update: Deck care",
            "branch": "main",
            "sha": "abc123",
            "content": encode(body)
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "commit": {
                "sha": "c0ffee",
                "html_url": "https://github.com/acme/site/commit/c0ffee"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let commit = client
        .put_file(&FileWrite {
            path: "content/blog/deck-care.mdx",
            content: body,
            message: "Update: Deck care",
            branch: "main",
            sha: Some("abc123"),
        })
        .await
        .expect("should commit");

    assert_eq!(commit.revision_id, "c0ffee");
    assert_eq!(commit.commit_url, "https://github.com/acme/site/commit/c0ffee");
}

#[tokio::test]
async fn put_file_without_html_url_builds_commit_url() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(FILE_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "commit": { "sha": "beef" } })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let commit = client
        .put_file(&FileWrite {
            path: "content/blog/deck-care.mdx",
            content: "Body",
            message: "Publish: Deck care",
            branch: "main",
            sha: None,
        })
        .await
        .expect("should commit");

    assert_eq!(commit.commit_url, "https://github.com/acme/site/commit/beef");
}

#[tokio::test]
async fn stale_sha_is_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(FILE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            serde_json::json!({ "message": "content/blog/deck-care.mdx does not match abc123" }),
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .put_file(&FileWrite {
            path: "content/blog/deck-care.mdx",
            content: "Body",
            message: "Update: Deck care",
            branch: "main",
            sha: Some("abc123"),
        })
        .await
        .unwrap_err();

    match err {
        GitHubError::Conflict { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("does not match"), "got {message}");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/site"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.default_branch().await.unwrap_err();
    assert!(
        matches!(&err, GitHubError::Status { status: 502, message } if message == "bad gateway"),
        "got {err:?}"
    );
    assert!(!err.is_configuration());
}

#[tokio::test]
async fn unconfigured_client_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = GitHubClient::with_base_url(None, &server.uri(), Some("acme/site"))
        .expect("client construction should not fail");

    let err = client
        .get_file("content/blog/deck-care.mdx", "main")
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::NotConfigured(_)), "got {err:?}");
    assert!(err.is_configuration());
}
