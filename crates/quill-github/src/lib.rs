//! Minimal GitHub REST client for committing published articles through the
//! repository contents API.

pub mod client;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use types::{CommitRef, FileWrite, RemoteFile};
