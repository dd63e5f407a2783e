//! # runassert core
//!
//! Domain types and collaborator traits for the runassert decision engine.
//! This crate carries no evaluation logic of its own: it defines the resource
//! document, the selector term model and the two seams the engine consumes.
//!
//! ## Collaborators
//!
//! - [`Matcher`] evaluates a list of [`SelectTerm`]s against one [`Resource`].
//! - [`Merger`] computes a three-way merge of structured documents.
//!
//! Reference implementations live in `runassert-selector` and
//! `runassert-apply`; hosts may plug in their own.

pub mod error;
pub mod info;
pub mod labels;
pub mod matcher;
pub mod merge;
pub mod resource;
pub mod selector;

// Re-export key types at crate root for ergonomics
pub use error::{MatchError, MergeError, UnknownVariant};
pub use info::{IncludeInfo, IncludeInfoKey};
pub use matcher::Matcher;
pub use merge::Merger;
pub use resource::{Document, Resource};
pub use selector::{SelectTerm, SelectorOperator, SelectorRequirement};
