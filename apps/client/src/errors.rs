#![allow(dead_code)]

use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::backend::DocStoreError;

/// Application-level error type. Carries the technical cause for logs;
/// `user_message` is what a screen would actually show.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("guests cannot save resources")]
    GuestsCannotBookmark,

    #[error("a bookmark change for this resource is already in progress")]
    BookmarkInFlight,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("document store error: {0}")]
    DocStore(#[from] DocStoreError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::GuestsCannotBookmark => {
                "Sign in with an account to save resources for later.".to_string()
            }
            AppError::BookmarkInFlight => "Hold on — still saving that one.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Auth(e) => e.user_message().to_string(),
            // Backend and storage failures render as the empty state; the
            // detail stays in the logs.
            AppError::DocStore(e) => {
                tracing::error!("document store error: {e}");
                "No resources found".to_string()
            }
            AppError::Storage(msg) => {
                tracing::error!("storage error: {msg}");
                "Could not upload the photo. Please try again.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
