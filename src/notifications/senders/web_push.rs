use async_trait::async_trait;
use reqwest::Client;
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

use super::{PushError, PushSender};
use crate::notifications::models::PushSubscriptionInfo;
use crate::notifications::vapid::VapidCredentials;

/// How long the push service keeps an undelivered message.
const DEFAULT_TTL_SECONDS: u32 = 24 * 60 * 60;

/// A sender for RFC 8030 web push.
///
/// `web-push` signs the VAPID JWT and encrypts the payload (RFC 8291); the
/// HTTP request itself goes out through a shared `reqwest::Client`.
pub struct WebPushSender {
    client: Client,
    vapid: VapidCredentials,
}

impl WebPushSender {
    pub fn new(vapid: VapidCredentials) -> Self {
        Self {
            client: Client::new(),
            vapid,
        }
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        subscription: &PushSubscriptionInfo,
        payload: &[u8],
    ) -> Result<(), PushError> {
        let sub_info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut sig_builder = VapidSignatureBuilder::from_base64(self.vapid.private_key(), &sub_info)
            .map_err(|e| PushError::Encoding(format!("VAPID key rejected: {e}")))?;
        sig_builder.add_claim("sub", self.vapid.subject());
        let signature = sig_builder
            .build()
            .map_err(|e| PushError::Encoding(format!("Failed to sign VAPID JWT: {e}")))?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(DEFAULT_TTL_SECONDS);
        let message = builder
            .build()
            .map_err(|e| PushError::InvalidSubscription(e.to_string()))?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }

        if let Some(topic) = message.topic {
            request = request.header("Topic", topic);
        }

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
