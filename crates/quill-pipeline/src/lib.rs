//! The publication pipeline: topic claim, article generation, draft
//! materialization, and scheduled commits to the content repository.

pub mod error;
pub mod frontmatter;
pub mod investigate;
pub mod materialize;
pub mod notify;
pub mod outcome;
pub mod pipeline;
pub mod publish;

pub use error::{PipelineError, PublishError};
pub use investigate::investigate_idea;
pub use materialize::{build_draft, draft_slug, materialize};
pub use notify::{Notifier, PublishedNotice};
pub use outcome::{FailureKind, FlowOutcome, FlowSummary, InvocationReport};
pub use pipeline::{Pipeline, PipelineSettings};
pub use publish::{check_preconditions, Publisher};
