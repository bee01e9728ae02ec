//! SeaORM entities mapping the application's tables.
//!
//! Each entity lives in its own module; the prelude re-exports them under
//! short aliases for the services and routes.

pub mod memory;
pub mod notification;
pub mod pick_option;
pub mod push_subscription;
pub mod shopping_item;

pub mod prelude {
    pub use super::push_subscription::Entity as PushSubscription;
    pub use super::push_subscription::Model as PushSubscriptionModel;
    pub use super::push_subscription::ActiveModel as PushSubscriptionActiveModel;
    pub use super::push_subscription::Column as PushSubscriptionColumn;

    pub use super::notification::Entity as Notification;
    pub use super::notification::Model as NotificationModel;
    pub use super::notification::ActiveModel as NotificationActiveModel;
    pub use super::notification::Column as NotificationColumn;

    pub use super::pick_option::Entity as PickOption;
    pub use super::pick_option::Model as PickOptionModel;
    pub use super::pick_option::ActiveModel as PickOptionActiveModel;
    pub use super::pick_option::Column as PickOptionColumn;

    pub use super::shopping_item::Entity as ShoppingItem;
    pub use super::shopping_item::Model as ShoppingItemModel;
    pub use super::shopping_item::ActiveModel as ShoppingItemActiveModel;
    pub use super::shopping_item::Column as ShoppingItemColumn;

    pub use super::memory::Entity as Memory;
    pub use super::memory::Model as MemoryModel;
    pub use super::memory::ActiveModel as MemoryActiveModel;
    pub use super::memory::Column as MemoryColumn;
}
