pub mod auth;
pub mod seed;
pub mod tender;
pub mod user;

use crate::services::ServiceFactory;

/// `explicit` if given, otherwise the logged-in user
pub(crate) fn target_user(factory: &ServiceFactory, explicit: Option<i32>) -> anyhow::Result<i32> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    factory
        .session()
        .current()?
        .map(|user| user.id)
        .ok_or_else(|| anyhow::anyhow!("Not logged in; run `tenders auth login` or pass --user"))
}
