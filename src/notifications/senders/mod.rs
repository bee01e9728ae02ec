use async_trait::async_trait;
use thiserror::Error;

use super::models::PushSubscriptionInfo;

pub mod web_push;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),
    #[error("Failed to sign or encrypt push message: {0}")]
    Encoding(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Push service returned non-success status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl PushError {
    /// HTTP status reported by the push service, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PushError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 404 and 410 mean the endpoint is permanently gone and the subscription should be dropped.
    pub fn is_gone(&self) -> bool {
        matches!(self.status_code(), Some(404 | 410))
    }
}

/// Delivers one encrypted payload to one browser push subscription.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscriptionInfo,
        payload: &[u8],
    ) -> Result<(), PushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> PushError {
        PushError::Rejected { status, body: String::new() }
    }

    #[test]
    fn only_404_and_410_are_gone() {
        assert!(rejected(404).is_gone());
        assert!(rejected(410).is_gone());
        assert!(!rejected(429).is_gone());
        assert!(!rejected(500).is_gone());
        assert!(!PushError::InvalidSubscription("bad json".into()).is_gone());
        assert_eq!(PushError::Encoding("x".into()).status_code(), None);
    }
}
