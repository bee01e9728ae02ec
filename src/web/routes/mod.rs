pub mod admin_routes;
pub mod memory_routes;
pub mod notification_routes;
pub mod pick_routes;
pub mod push_routes;
pub mod shopping_routes;
