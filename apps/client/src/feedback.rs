use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::backend::auth::Identity;
use crate::backend::DocStoreError;
use crate::errors::AppError;

/// A feedback submission document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, feedback: &Feedback) -> Result<(), DocStoreError>;
}

pub struct FeedbackService {
    sink: Arc<dyn FeedbackSink>,
}

impl FeedbackService {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> FeedbackService {
        FeedbackService { sink }
    }

    pub async fn submit(
        &self,
        identity: &Identity,
        email: &str,
        message: &str,
    ) -> Result<Feedback, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation(
                "feedback message must not be empty".to_string(),
            ));
        }

        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: identity.user_id.clone(),
            email: email.trim().to_string(),
            message: message.to_string(),
            submitted_at: Utc::now(),
        };
        self.sink.submit(&feedback).await?;
        info!(feedback_id = %feedback.id, "feedback submitted");
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        submitted: Mutex<Vec<Feedback>>,
    }

    #[async_trait]
    impl FeedbackSink for RecordingSink {
        async fn submit(&self, feedback: &Feedback) -> Result<(), DocStoreError> {
            self.submitted.lock().await.push(feedback.clone());
            Ok(())
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "u1".to_string(),
            token: "t".to_string(),
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_submit_posts_trimmed_feedback() {
        let sink = Arc::new(RecordingSink::default());
        let service = FeedbackService::new(sink.clone());

        let feedback = service
            .submit(&identity(), " s@x.edu ", "  The housing list is out of date.  ")
            .await
            .unwrap();
        assert_eq!(feedback.email, "s@x.edu");
        assert_eq!(feedback.message, "The housing list is out of date.");
        assert_eq!(sink.submitted.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_posting() {
        let sink = Arc::new(RecordingSink::default());
        let service = FeedbackService::new(sink.clone());

        let err = service.submit(&identity(), "s@x.edu", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(sink.submitted.lock().await.is_empty());
    }
}
