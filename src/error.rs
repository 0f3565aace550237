//! Centralized error type for the nestgraph umbrella crate.
//!
//! Node construction itself never fails; these errors come from setting up a
//! [`Composer`](crate::Composer): loading a library or validating config.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Compose(#[from] nestgraph_core::ComposeError),

    #[error("Library: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no backend configured")]
    NoBackend,
}

pub type Result<T> = std::result::Result<T, Error>;
