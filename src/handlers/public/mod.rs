// handlers/public/mod.rs - endpoints that need no bearer token
//
// Token acquisition, read-only tender access, and service status.
pub mod accounts;
pub mod system;
pub mod tenders;

pub use accounts::{login, register};
pub use system::{health, not_found, root};
pub use tenders::{filter_tenders, get_tender, list_tenders, search_tenders};
