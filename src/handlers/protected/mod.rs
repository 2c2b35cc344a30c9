// handlers/protected/mod.rs - endpoints behind `jwt_auth_middleware`
//
// Every handler here receives `Extension<AuthUser>` and runs the
// self-or-admin gate before touching anything.
pub mod subscriptions;
pub mod tenders;
pub mod users;

pub use subscriptions::{is_subscribed, subscribe, unsubscribe};
pub use tenders::{create_tender, delete_tender, update_tender};
pub use users::{change_password, get_user, update_user, user_subscriptions};
