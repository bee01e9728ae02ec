use chrono::{DateTime, Utc};
use futures::future::join_all;
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::{
    DispatchSummary, PushPayload, PushSubscriptionInfo, SendNotificationRequest, SubscribeRequest,
};
use super::senders::{PushError, PushSender};
use crate::db::entities::push_subscription;
use crate::db::services;

/// Minimum time between two notifications from the same sender.
pub const COOLDOWN_MS: i64 = 5 * 60 * 1000;

/// Label used when a sender or subscriber gives no name.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Missing VAPID keys.")]
    MissingVapidKeys,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Cooldown active, retry in {remaining_seconds}s")]
    CooldownActive { remaining_seconds: u64 },
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
}

/// Trims a free-text user label, falling back to [`ANONYMOUS`] when blank.
pub fn resolve_user_label(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

/// Seconds left before `sender` may notify again, `None` once the window has passed.
pub fn cooldown_remaining_seconds(last_sent_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let elapsed_ms = (now - last_sent_at).num_milliseconds();
    if elapsed_ms >= COOLDOWN_MS {
        return None;
    }
    let remaining_ms = (COOLDOWN_MS - elapsed_ms) as u64;
    Some(remaining_ms.div_ceil(1000))
}

/// Fans a message out to every push subscription except the sender's own.
///
/// The store handle and the push transport are injected; the dispatcher
/// keeps no state between calls.
pub struct NotificationDispatcher {
    db: DatabaseConnection,
    push_sender: Option<Arc<dyn PushSender>>,
    app_name: String,
}

impl NotificationDispatcher {
    /// `push_sender` is `None` when no VAPID keys are configured; every send then fails fast.
    pub fn new(
        db: DatabaseConnection,
        push_sender: Option<Arc<dyn PushSender>>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            db,
            push_sender,
            app_name: app_name.into(),
        }
    }

    pub async fn send_notification(
        &self,
        request: SendNotificationRequest,
    ) -> Result<DispatchSummary, NotificationError> {
        self.send_notification_at(request, Utc::now()).await
    }

    pub(crate) async fn send_notification_at(
        &self,
        request: SendNotificationRequest,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, NotificationError> {
        let push_sender = self
            .push_sender
            .as_deref()
            .ok_or(NotificationError::MissingVapidKeys)?;

        let message = match request.message {
            Some(Value::String(message)) if !message.is_empty() => message,
            _ => return Err(NotificationError::InvalidInput("Message is required.".to_string())),
        };
        let sender = resolve_user_label(request.sender.as_deref());
        let url = match request.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => "/".to_string(),
        };

        if !request.ignore_cooldown.unwrap_or(false) {
            if let Some(last) = services::get_last_notification_by_sender(&self.db, &sender).await? {
                if let Some(remaining_seconds) = cooldown_remaining_seconds(last.created_at, now) {
                    info!(sender = %sender, remaining_seconds, "Notification rejected, cooldown active.");
                    return Err(NotificationError::CooldownActive { remaining_seconds });
                }
            }
        }

        let audience = services::get_subscriptions_excluding_user(&self.db, &sender).await?;
        let payload = serde_json::to_vec(&PushPayload {
            title: self.app_name.clone(),
            body: message.clone(),
            url,
        })
        .map_err(|e| NotificationError::InvalidInput(format!("Unencodable message: {e}")))?;

        let outcomes = deliver_all(push_sender, &audience, &payload).await;

        let mut sent = 0;
        for (subscription, outcome) in outcomes {
            match outcome {
                Ok(()) => sent += 1,
                Err(e) if e.is_gone() => {
                    info!(
                        subscription_id = subscription.id,
                        user = %subscription.user_name,
                        status = ?e.status_code(),
                        "Push endpoint is gone. Removing subscription."
                    );
                    if let Err(db_err) = services::delete_subscription(&self.db, subscription.id).await {
                        error!(subscription_id = subscription.id, error = %db_err, "Failed to remove expired subscription.");
                    }
                }
                Err(e) => {
                    warn!(subscription_id = subscription.id, user = %subscription.user_name, error = %e, "Push delivery failed.");
                }
            }
        }

        info!(sender = %sender, targeted = audience.len(), sent, "Notification dispatched.");

        if sent > 0 {
            services::create_notification(&self.db, &self.app_name, &message, &sender, now).await?;
        }

        Ok(DispatchSummary { success: true, sent })
    }
}

/// Sends to every subscription concurrently and waits for all of them to settle.
///
/// Each stored subscription is parsed right before use; a row that does not
/// parse counts as a failed delivery for that row only.
async fn deliver_all<'a>(
    push_sender: &dyn PushSender,
    audience: &'a [push_subscription::Model],
    payload: &[u8],
) -> Vec<(&'a push_subscription::Model, Result<(), PushError>)> {
    let deliveries = audience.iter().map(|subscription| async move {
        let outcome = match serde_json::from_str::<PushSubscriptionInfo>(&subscription.subscription) {
            Ok(info) => push_sender.send(&info, payload).await,
            Err(e) => Err(PushError::InvalidSubscription(e.to_string())),
        };
        (subscription, outcome)
    });

    join_all(deliveries).await
}

/// Registers a browser subscription, updating the row already stored for its endpoint.
pub async fn subscribe(
    db: &DatabaseConnection,
    request: SubscribeRequest,
) -> Result<push_subscription::Model, NotificationError> {
    let subscription = request.subscription.unwrap_or(Value::Null);
    let endpoint = subscription
        .get("endpoint")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or_else(|| NotificationError::InvalidInput("Subscription endpoint is required.".to_string()))?
        .to_string();
    let user_name = resolve_user_label(request.user.as_deref());

    let stored = services::upsert_subscription(db, &user_name, &endpoint, &subscription.to_string()).await?;
    debug!(subscription_id = stored.id, user = %user_name, "Push subscription registered.");
    Ok(stored)
}

pub async fn is_subscribed(db: &DatabaseConnection, endpoint: Option<&str>) -> Result<bool, NotificationError> {
    match endpoint.map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => {
            Ok(services::find_by_endpoint(db, endpoint).await?.is_some())
        }
        _ => Ok(false),
    }
}

pub async fn unsubscribe(db: &DatabaseConnection, endpoint: Option<&str>) -> Result<(), NotificationError> {
    let endpoint = endpoint
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or_else(|| NotificationError::InvalidInput("Subscription endpoint is required.".to_string()))?;
    let result = services::delete_subscription_by_endpoint(db, endpoint).await?;
    debug!(removed = result.rows_affected, "Push subscription removed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use async_trait::async_trait;
    use chrono::Duration;
    use sea_orm::{ConnectionTrait, EntityTrait};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::db::entities::notification;

    /// Records every delivery and fails the endpoints it was told to fail.
    #[derive(Default)]
    struct ScriptedSender {
        failures: HashMap<String, u16>,
        deliveries: Mutex<Vec<(String, PushPayload)>>,
    }

    impl ScriptedSender {
        fn failing(endpoint: &str, status: u16) -> Self {
            Self {
                failures: HashMap::from([(endpoint.to_string(), status)]),
                ..Default::default()
            }
        }

        fn delivered_endpoints(&self) -> Vec<String> {
            let mut endpoints: Vec<String> =
                self.deliveries.lock().unwrap().iter().map(|(e, _)| e.clone()).collect();
            endpoints.sort();
            endpoints
        }
    }

    #[async_trait]
    impl PushSender for ScriptedSender {
        async fn send(&self, subscription: &PushSubscriptionInfo, payload: &[u8]) -> Result<(), PushError> {
            let decoded: PushPayload = serde_json::from_slice(payload).unwrap();
            self.deliveries
                .lock()
                .unwrap()
                .push((subscription.endpoint.clone(), decoded));
            match self.failures.get(&subscription.endpoint) {
                Some(status) => Err(PushError::Rejected { status: *status, body: "nope".into() }),
                None => Ok(()),
            }
        }
    }

    fn endpoint(user: &str) -> String {
        format!("https://push.example.com/{}", user.to_lowercase())
    }

    async fn register(db: &DatabaseConnection, user: &str) -> push_subscription::Model {
        subscribe(
            db,
            SubscribeRequest {
                subscription: Some(json!({
                    "endpoint": endpoint(user),
                    "keys": { "p256dh": "BPub", "auth": "secret" }
                })),
                user: Some(user.to_string()),
            },
        )
        .await
        .unwrap()
    }

    fn dispatcher(db: &DatabaseConnection, sender: Arc<ScriptedSender>) -> NotificationDispatcher {
        NotificationDispatcher::new(db.clone(), Some(sender as Arc<dyn PushSender>), "Pairplan")
    }

    fn request(sender: &str, message: &str) -> SendNotificationRequest {
        SendNotificationRequest {
            sender: Some(sender.to_string()),
            message: Some(json!(message)),
            ..Default::default()
        }
    }

    async fn history(db: &DatabaseConnection) -> Vec<notification::Model> {
        notification::Entity::find().all(db).await.unwrap()
    }

    #[test]
    fn cooldown_rounds_remaining_time_up() {
        let t0 = Utc::now();
        assert_eq!(cooldown_remaining_seconds(t0, t0 + Duration::seconds(60)), Some(240));
        assert_eq!(cooldown_remaining_seconds(t0, t0 + Duration::milliseconds(60_001)), Some(240));
        assert_eq!(cooldown_remaining_seconds(t0, t0 + Duration::milliseconds(299_999)), Some(1));
        assert_eq!(cooldown_remaining_seconds(t0, t0 + Duration::seconds(300)), None);
        assert_eq!(cooldown_remaining_seconds(t0, t0 + Duration::hours(2)), None);
    }

    #[test]
    fn blank_labels_become_anonymous() {
        assert_eq!(resolve_user_label(None), ANONYMOUS);
        assert_eq!(resolve_user_label(Some("   ")), ANONYMOUS);
        assert_eq!(resolve_user_label(Some("  Bob ")), "Bob");
    }

    #[tokio::test]
    async fn sender_is_excluded_and_history_is_recorded() {
        let db = test_db().await;
        for user in ["Bob", "Carol", "Alice"] {
            register(&db, user).await;
        }
        let push = Arc::new(ScriptedSender::default());

        let summary = dispatcher(&db, push.clone())
            .send_notification(request("Alice", "Dinner?"))
            .await
            .unwrap();

        assert_eq!(summary, DispatchSummary { success: true, sent: 2 });
        assert_eq!(push.delivered_endpoints(), vec![endpoint("Bob"), endpoint("Carol")]);

        let records = history(&db).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender, "Alice");
        assert_eq!(records[0].body, "Dinner?");
        assert_eq!(records[0].title, "Pairplan");
    }

    #[tokio::test]
    async fn gone_subscription_is_pruned() {
        let db = test_db().await;
        for user in ["Bob", "Carol", "Alice"] {
            register(&db, user).await;
        }
        let push = Arc::new(ScriptedSender::failing(&endpoint("Carol"), 410));

        let summary = dispatcher(&db, push).send_notification(request("Alice", "Dinner?")).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert!(services::find_by_endpoint(&db, &endpoint("Carol")).await.unwrap().is_none());
        assert!(services::find_by_endpoint(&db, &endpoint("Bob")).await.unwrap().is_some());
        assert_eq!(history(&db).await.len(), 1);
    }

    #[tokio::test]
    async fn not_found_subscription_is_pruned_too() {
        let db = test_db().await;
        register(&db, "Bob").await;
        let push = Arc::new(ScriptedSender::failing(&endpoint("Bob"), 404));

        let summary = dispatcher(&db, push).send_notification(request("Alice", "Hi")).await.unwrap();

        assert_eq!(summary.sent, 0);
        assert!(services::get_all_subscriptions(&db).await.unwrap().is_empty());
        assert!(history(&db).await.is_empty());
    }

    #[tokio::test]
    async fn transient_failure_keeps_subscription() {
        let db = test_db().await;
        register(&db, "Bob").await;
        register(&db, "Carol").await;
        let push = Arc::new(ScriptedSender::failing(&endpoint("Bob"), 503));

        let summary = dispatcher(&db, push).send_notification(request("Alice", "Hi")).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(services::get_all_subscriptions(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unparseable_subscription_fails_only_that_delivery() {
        let db = test_db().await;
        register(&db, "Bob").await;
        services::upsert_subscription(&db, "Carol", &endpoint("Carol"), "{\"endpoint\": 42}")
            .await
            .unwrap();
        let push = Arc::new(ScriptedSender::default());

        let summary = dispatcher(&db, push.clone())
            .send_notification(request("Alice", "Hi"))
            .await
            .unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(push.delivered_endpoints(), vec![endpoint("Bob")]);
        assert_eq!(services::get_all_subscriptions(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_audience_means_no_history_and_no_cooldown() {
        let db = test_db().await;
        register(&db, "Alice").await;
        let push = Arc::new(ScriptedSender::default());
        let dispatcher = dispatcher(&db, push.clone());

        let first = dispatcher.send_notification(request("Alice", "Anyone?")).await.unwrap();
        let second = dispatcher.send_notification(request("Alice", "Anyone?")).await.unwrap();

        assert_eq!(first, DispatchSummary { success: true, sent: 0 });
        assert_eq!(second.sent, 0);
        assert!(push.delivered_endpoints().is_empty());
        assert!(history(&db).await.is_empty());
    }

    #[tokio::test]
    async fn cooldown_is_enforced_per_sender() {
        let db = test_db().await;
        for user in ["Alice", "Bob"] {
            register(&db, user).await;
        }
        let dispatcher = dispatcher(&db, Arc::new(ScriptedSender::default()));
        let t0 = Utc::now();

        dispatcher.send_notification_at(request("Alice", "one"), t0).await.unwrap();

        let blocked = dispatcher
            .send_notification_at(request("Alice", "two"), t0 + Duration::seconds(60))
            .await
            .unwrap_err();
        assert!(matches!(blocked, NotificationError::CooldownActive { remaining_seconds: 240 }));

        // Another sender is not affected by Alice's window.
        let bob = dispatcher
            .send_notification_at(request("Bob", "hey"), t0 + Duration::seconds(60))
            .await
            .unwrap();
        assert_eq!(bob.sent, 1);

        let after_window = dispatcher
            .send_notification_at(request("Alice", "three"), t0 + Duration::seconds(300))
            .await
            .unwrap();
        assert_eq!(after_window.sent, 1);
    }

    #[tokio::test]
    async fn ignore_cooldown_bypasses_the_gate() {
        let db = test_db().await;
        register(&db, "Bob").await;
        let dispatcher = dispatcher(&db, Arc::new(ScriptedSender::default()));
        let t0 = Utc::now();

        dispatcher.send_notification_at(request("Alice", "one"), t0).await.unwrap();
        let mut urgent = request("Alice", "two");
        urgent.ignore_cooldown = Some(true);
        let summary = dispatcher
            .send_notification_at(urgent, t0 + Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(history(&db).await.len(), 2);
    }

    #[tokio::test]
    async fn payload_uses_app_name_default_url_and_anonymous_sender() {
        let db = test_db().await;
        register(&db, "Bob").await;
        let push = Arc::new(ScriptedSender::default());

        dispatcher(&db, push.clone())
            .send_notification(SendNotificationRequest {
                sender: Some("  ".to_string()),
                message: Some(json!("Movie night")),
                url: Some(" ".to_string()),
                ignore_cooldown: None,
            })
            .await
            .unwrap();

        let deliveries = push.deliveries.lock().unwrap();
        let (_, payload) = &deliveries[0];
        assert_eq!(payload.title, "Pairplan");
        assert_eq!(payload.body, "Movie night");
        assert_eq!(payload.url, "/");
        drop(deliveries);
        assert_eq!(history(&db).await[0].sender, ANONYMOUS);
    }

    #[tokio::test]
    async fn missing_vapid_keys_fail_before_validation() {
        let db = test_db().await;
        let dispatcher = NotificationDispatcher::new(db, None, "Pairplan");

        let err = dispatcher.send_notification(SendNotificationRequest::default()).await.unwrap_err();
        assert!(matches!(err, NotificationError::MissingVapidKeys));
    }

    #[tokio::test]
    async fn message_must_be_a_non_empty_string() {
        let db = test_db().await;
        let dispatcher = dispatcher(&db, Arc::new(ScriptedSender::default()));

        for message in [None, Some(json!("")), Some(json!(12)), Some(json!({"text": "hi"}))] {
            let err = dispatcher
                .send_notification(SendNotificationRequest { message, ..Default::default() })
                .await
                .unwrap_err();
            assert!(matches!(err, NotificationError::InvalidInput(ref m) if m == "Message is required."));
        }
    }

    #[tokio::test]
    async fn subscribe_requires_an_endpoint() {
        let db = test_db().await;
        let err = subscribe(
            &db,
            SubscribeRequest { subscription: Some(json!({"keys": {}})), user: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, NotificationError::InvalidInput(_)));

        let stored = register(&db, "Bob").await;
        assert!(is_subscribed(&db, Some(&stored.endpoint)).await.unwrap());
        assert!(!is_subscribed(&db, None).await.unwrap());

        unsubscribe(&db, Some(&stored.endpoint)).await.unwrap();
        assert!(!is_subscribed(&db, Some(&stored.endpoint)).await.unwrap());
    }

    /// Drops the subscription table when asked to deliver to the gone endpoint.
    struct TableDroppingSender {
        db: DatabaseConnection,
        gone_endpoint: String,
    }

    #[async_trait]
    impl PushSender for TableDroppingSender {
        async fn send(&self, subscription: &PushSubscriptionInfo, _payload: &[u8]) -> Result<(), PushError> {
            if subscription.endpoint != self.gone_endpoint {
                return Ok(());
            }
            self.db
                .execute_unprepared("DROP TABLE push_subscriptions")
                .await
                .unwrap();
            Err(PushError::Rejected { status: 410, body: String::new() })
        }
    }

    #[tokio::test]
    async fn failed_prune_is_logged_not_returned() {
        let db = test_db().await;
        register(&db, "Bob").await;
        register(&db, "Carol").await;
        let push = TableDroppingSender { db: db.clone(), gone_endpoint: endpoint("Carol") };
        let dispatcher = NotificationDispatcher::new(db.clone(), Some(Arc::new(push) as Arc<dyn PushSender>), "Pairplan");

        let summary = dispatcher.send_notification(request("Alice", "Dinner?")).await.unwrap();

        assert_eq!(summary, DispatchSummary { success: true, sent: 1 });
        assert_eq!(history(&db).await.len(), 1);
    }

    /// Takes a fixed time for every delivery.
    struct SlowSender {
        delay: std::time::Duration,
    }

    #[async_trait]
    impl PushSender for SlowSender {
        async fn send(&self, _subscription: &PushSubscriptionInfo, _payload: &[u8]) -> Result<(), PushError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn deliveries_run_concurrently() {
        let db = test_db().await;
        for user in ["Bob", "Carol", "Dave", "Erin", "Frank"] {
            register(&db, user).await;
        }
        let delay = std::time::Duration::from_millis(300);
        let dispatcher = NotificationDispatcher::new(
            db.clone(),
            Some(Arc::new(SlowSender { delay }) as Arc<dyn PushSender>),
            "Pairplan",
        );

        let started = std::time::Instant::now();
        let summary = dispatcher.send_notification(request("Alice", "Movie night")).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(summary.sent, 5);
        assert!(elapsed < delay * 2, "fan-out took {elapsed:?}");
    }
}
