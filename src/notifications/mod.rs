//! Web push notifications between the two of us.
//!
//! Browsers register push subscriptions; a message sent by one person is
//! fanned out to every other subscription, dead endpoints are pruned, and
//! messages that reached someone are kept as history.

pub mod models;
pub mod senders;
pub mod service;
pub mod vapid;
