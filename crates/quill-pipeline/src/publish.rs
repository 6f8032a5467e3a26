//! Committing a finished draft to the content repository.

use chrono::{DateTime, Utc};
use quill_core::{sanitize, AppConfig};
use quill_db::DraftRow;
use quill_github::{CommitRef, FileWrite, GitHubClient, GitHubError};

use crate::error::PublishError;
use crate::frontmatter::render_document;

/// Writes one file per slug under `content_dir` on the target branch.
pub struct Publisher {
    github: GitHubClient,
    content_dir: String,
    extension: String,
    branch: Option<String>,
}

impl Publisher {
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidConfig`] for a malformed repository or
    /// API URL.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GitHubError> {
        Ok(Self::new(
            GitHubClient::from_app_config(config)?,
            &config.content_dir,
            &config.content_extension,
            config.github_branch.clone(),
        ))
    }

    /// `branch: None` commits to the repository's default branch.
    #[must_use]
    pub fn new(
        github: GitHubClient,
        content_dir: &str,
        extension: &str,
        branch: Option<String>,
    ) -> Self {
        Self {
            github,
            content_dir: content_dir.trim_matches('/').to_string(),
            extension: extension.trim_start_matches('.').to_string(),
            branch: branch.filter(|b| !b.trim().is_empty()),
        }
    }

    /// # Errors
    ///
    /// Returns [`GitHubError::NotConfigured`] naming the missing setting.
    pub fn ensure_configured(&self) -> Result<(), GitHubError> {
        self.github.ensure_configured()
    }

    /// Repository path of the file for `slug`.
    #[must_use]
    pub fn path_for(&self, slug: &str) -> String {
        if self.content_dir.is_empty() {
            format!("{slug}.{}", self.extension)
        } else {
            format!("{}/{slug}.{}", self.content_dir, self.extension)
        }
    }

    /// Commit `draft` as a single file, creating or overwriting it.
    ///
    /// Preconditions are checked before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingField`] when the title, body, or slug is
    /// empty, or [`PublishError::Store`] when a repository call fails.
    pub async fn commit(
        &self,
        draft: &DraftRow,
        now: DateTime<Utc>,
    ) -> Result<CommitRef, PublishError> {
        check_preconditions(draft)?;
        self.github.ensure_configured()?;

        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => self.github.default_branch().await?,
        };
        let path = self.path_for(&draft.slug);
        let existing = self.github.get_file(&path, &branch).await?;

        let title = draft.title.trim();
        let message = if existing.is_some() {
            format!("Update: {title}")
        } else {
            format!("Publish: {title}")
        };
        let document = render_document(draft, now);

        let commit = self
            .github
            .put_file(&FileWrite {
                path: &path,
                content: &document,
                message: &message,
                branch: &branch,
                sha: existing.as_ref().map(|f| f.sha.as_str()),
            })
            .await?;

        tracing::info!(
            draft_id = draft.id,
            path = %path,
            branch = %branch,
            revision = %commit.revision_id,
            "pipeline: draft committed"
        );
        Ok(commit)
    }
}

/// Title, sanitized body, and slug must all be non-empty.
///
/// # Errors
///
/// Returns [`PublishError::MissingField`] naming the first empty field.
pub fn check_preconditions(draft: &DraftRow) -> Result<(), PublishError> {
    if draft.title.trim().is_empty() {
        return Err(PublishError::MissingField("title"));
    }
    if sanitize(&draft.content).is_empty() {
        return Err(PublishError::MissingField("body"));
    }
    if draft.slug.trim().is_empty() {
        return Err(PublishError::MissingField("slug"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(dir: &str, ext: &str) -> Publisher {
        let github = GitHubClient::with_base_url(None, "https://api.github.com", None)
            .expect("client construction should not fail");
        Publisher::new(github, dir, ext, None)
    }

    #[test]
    fn path_is_derived_from_slug() {
        assert_eq!(
            publisher("content/blog", "mdx").path_for("deck-care"),
            "content/blog/deck-care.mdx"
        );
        assert_eq!(
            publisher("/posts/", ".md").path_for("deck-care"),
            "posts/deck-care.md"
        );
        assert_eq!(publisher("", "md").path_for("deck-care"), "deck-care.md");
    }

    #[test]
    fn unconfigured_store_is_reported() {
        let err = publisher("content/blog", "mdx")
            .ensure_configured()
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
