//! Core types, configuration, and error handling for diffward.
//!
//! This crate provides the shared foundation used by the other diffward crates:
//! - [`ReviewError`]: unified error type using `thiserror`
//! - [`RawInputs`]: layered, unvalidated review inputs, and the closed
//!   enums they validate into: [`ModelName`], [`CategoryStyle`], [`PostingMode`]
//! - [`EventContext`] and [`ActionOutputs`]: the workflow runner's side of a run
//! - [`NoticeSink`]: injected receiver for informational notes
//! - Shared types: [`ChangedFile`], [`RepoRef`], [`PrTarget`]

mod config;
mod context;
mod error;
mod notice;
pub mod outputs;
mod types;

pub use config::{
    parse_leading_int, CategoryStyle, ModelName, PostingMode, RawInputs, INPUT_NAMES,
};
pub use context::EventContext;
pub use error::ReviewError;
pub use notice::{NoticeSink, SilentSink, TracingSink};
pub use outputs::{ActionOutputs, REVIEW_BODY_OUTPUT};
pub use types::{ChangedFile, PrTarget, RepoRef};

/// A convenience `Result` type for diffward operations.
pub type Result<T> = std::result::Result<T, ReviewError>;
