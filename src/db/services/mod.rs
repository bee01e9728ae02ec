//! Data access for every table, one sub-module per entity.
//!
//! All public functions are re-exported here so callers can use
//! `crate::db::services::*` without knowing which file a query lives in.

pub mod memory_service;
pub mod notification_service;
pub mod pick_service;
pub mod shopping_service;
pub mod subscription_service;

pub use memory_service::*;
pub use notification_service::*;
pub use pick_service::*;
pub use shopping_service::*;
pub use subscription_service::*;
