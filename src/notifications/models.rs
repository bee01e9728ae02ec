use serde::{Deserialize, Serialize};

/// A browser push subscription as produced by `PushManager.subscribe()`.
///
/// Stored serialized on the subscription row and parsed right before each delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionInfo {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// The JSON document delivered to the service worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// API request body for sending a notification to everyone else.
///
/// `message` stays an untyped JSON value so a non-string message is reported
/// as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub sender: Option<String>,
    pub message: Option<serde_json::Value>,
    pub url: Option<String>,
    pub ignore_cooldown: Option<bool>,
}

/// Outcome of a dispatch. `sent` counts successful deliveries and may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub success: bool,
    pub sent: usize,
}

/// API request body for registering a push subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub subscription: Option<serde_json::Value>,
    pub user: Option<String>,
}

/// API request body carrying just an endpoint (check / unsubscribe).
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointRequest {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSubscriptionResponse {
    pub subscribed: bool,
}
