pub mod tender;
pub mod user;

pub use tender::{into_tenders, TenderRow};
pub use user::UserRow;
