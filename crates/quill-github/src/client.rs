//! HTTP client for the GitHub repository contents API.

use std::time::Duration;

use base64::Engine;
use quill_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};

use crate::error::GitHubError;
use crate::types::{
    CommitRef, ContentResponse, ErrorResponse, FileWrite, PutContentRequest, PutContentResponse,
    RemoteFile, RepoResponse,
};

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for one GitHub repository.
///
/// Construction never fails for missing credentials; calls on an
/// unconfigured client return [`GitHubError::NotConfigured`] without
/// touching the network.
pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    api_url: Url,
    repo: Option<(String, String)>,
}

impl GitHubClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidConfig`] if the API URL or repository is
    /// malformed, or [`GitHubError::Http`] if the client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GitHubError> {
        Self::with_base_url(
            config.github_token.clone(),
            &config.github_api_url,
            config.github_repo.as_deref(),
        )
    }

    /// Creates a client pointed at the public GitHub API.
    ///
    /// # Errors
    ///
    /// See [`GitHubClient::with_base_url`].
    pub fn new(token: Option<String>, repo: Option<&str>) -> Result<Self, GitHubError> {
        Self::with_base_url(token, DEFAULT_API_URL, repo)
    }

    /// Creates a client with a custom API URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidConfig`] if `api_url` is not a valid URL
    /// or `repo` is not `owner/name`, or [`GitHubError::Http`] if the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        token: Option<String>,
        api_url: &str,
        repo: Option<&str>,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("quill/0.1 (content-pipeline)")
            .default_headers(headers)
            .build()?;

        let normalised = format!("{}/", api_url.trim_end_matches('/'));
        let api_url = Url::parse(&normalised)
            .map_err(|e| GitHubError::InvalidConfig(format!("invalid API URL '{api_url}': {e}")))?;

        let repo = repo
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| match r.split_once('/') {
                Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                    Ok((owner.to_string(), name.to_string()))
                }
                _ => Err(GitHubError::InvalidConfig(format!(
                    "repository must be 'owner/name', got '{r}'"
                ))),
            })
            .transpose()?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            api_url,
            repo,
        })
    }

    /// Whether both a token and a repository are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.repo.is_some()
    }

    /// Fail fast when the client cannot make authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::NotConfigured`] naming the missing setting.
    pub fn ensure_configured(&self) -> Result<(), GitHubError> {
        self.credentials().map(|_| ())
    }

    /// Resolve the repository's default branch.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::NotConfigured`], [`GitHubError::Status`] on a
    /// non-2xx response, or [`GitHubError::Http`] on network failure.
    pub async fn default_branch(&self) -> Result<String, GitHubError> {
        let (token, owner, name) = self.credentials()?;
        let url = self.url(&["repos", owner, name]);

        let response = authorized(self.client.get(url), token).send().await?;
        let response = check_status(response).await?;
        let repo: RepoResponse = response.json().await?;
        Ok(repo.default_branch)
    }

    /// Fetch a file at `branch`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::NotConfigured`], [`GitHubError::Status`] on a
    /// non-2xx, non-404 response, [`GitHubError::Decode`] if the content is
    /// not base64 UTF-8, or [`GitHubError::Http`] on network failure.
    pub async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, GitHubError> {
        let (token, owner, name) = self.credentials()?;
        let mut url = self.contents_url(owner, name, path);
        url.query_pairs_mut().append_pair("ref", branch);

        let response = authorized(self.client.get(url), token).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let body: ContentResponse = response.json().await?;

        if body.encoding.as_deref().is_some_and(|e| e != "base64") {
            return Err(GitHubError::Decode(format!(
                "unsupported content encoding for {path}"
            )));
        }
        let compact: String = body.content.split_whitespace().collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| GitHubError::Decode(format!("{path}: {e}")))?;
        let content =
            String::from_utf8(bytes).map_err(|e| GitHubError::Decode(format!("{path}: {e}")))?;

        Ok(Some(RemoteFile {
            sha: body.sha,
            content,
        }))
    }

    /// Create or overwrite a file with a single commit on `write.branch`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Conflict`] on 409/422 (stale or missing SHA),
    /// [`GitHubError::Status`] on any other non-2xx response,
    /// [`GitHubError::NotConfigured`], or [`GitHubError::Http`].
    pub async fn put_file(&self, write: &FileWrite<'_>) -> Result<CommitRef, GitHubError> {
        let (token, owner, name) = self.credentials()?;
        let url = self.contents_url(owner, name, write.path);

        let body = PutContentRequest {
            message: write.message,
            content: base64::engine::general_purpose::STANDARD.encode(write.content),
            branch: write.branch,
            sha: write.sha,
        };

        let response = authorized(self.client.put(url), token)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let payload: PutContentResponse = response.json().await?;

        let commit_url = payload.commit.html_url.unwrap_or_else(|| {
            format!(
                "https://github.com/{owner}/{name}/commit/{}",
                payload.commit.sha
            )
        });
        tracing::debug!(path = write.path, sha = %payload.commit.sha, "github: file committed");

        Ok(CommitRef {
            commit_url,
            revision_id: payload.commit.sha,
        })
    }

    fn credentials(&self) -> Result<(&str, &str, &str), GitHubError> {
        let token = self
            .token
            .as_deref()
            .ok_or(GitHubError::NotConfigured("GITHUB_TOKEN"))?;
        let (owner, name) = self
            .repo
            .as_ref()
            .ok_or(GitHubError::NotConfigured("QUILL_GITHUB_REPO"))?;
        Ok((token, owner.as_str(), name.as_str()))
    }

    fn contents_url(&self, owner: &str, name: &str, path: &str) -> Url {
        let mut segments = vec!["repos", owner, name, "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.url(&segments)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn authorized(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(AUTHORIZATION, format!("Bearer {token}"))
}

async fn check_status(response: Response) -> Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or(text);

    if matches!(status, StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY) {
        Err(GitHubError::Conflict {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(GitHubError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(api_url: &str) -> GitHubClient {
        GitHubClient::with_base_url(Some("tok".to_string()), api_url, Some("acme/site"))
            .expect("client construction should not fail")
    }

    #[test]
    fn contents_url_keeps_path_segments() {
        let client = test_client("https://api.github.com");
        let url = client.contents_url("acme", "site", "content/blog/deck-care.mdx");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/site/contents/content/blog/deck-care.mdx"
        );
    }

    #[test]
    fn api_url_with_prefix_path_is_preserved() {
        let client = test_client("https://ghe.example.com/api/v3/");
        let url = client.url(&["repos", "acme", "site"]);
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/acme/site");
    }

    #[test]
    fn missing_token_or_repo_is_not_configured() {
        let no_token = GitHubClient::with_base_url(None, "https://api.github.com", Some("a/b"))
            .expect("client");
        assert!(!no_token.is_configured());
        assert!(matches!(
            no_token.ensure_configured(),
            Err(GitHubError::NotConfigured("GITHUB_TOKEN"))
        ));

        let no_repo =
            GitHubClient::with_base_url(Some("t".to_string()), "https://api.github.com", None)
                .expect("client");
        assert!(matches!(
            no_repo.ensure_configured(),
            Err(GitHubError::NotConfigured("QUILL_GITHUB_REPO"))
        ));
    }

    #[test]
    fn malformed_repo_is_rejected() {
        for repo in ["acme", "acme/", "/site", "a/b/c"] {
            let result = GitHubClient::with_base_url(None, "https://api.github.com", Some(repo));
            assert!(
                matches!(result, Err(GitHubError::InvalidConfig(_))),
                "repo {repo} should be rejected"
            );
        }
    }
}
