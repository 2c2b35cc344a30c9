use thiserror::Error;

use crate::types::Role;

/// The identity performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i32, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Not authorized to {action}")]
pub struct AccessDenied {
    pub action: String,
}

impl AccessDenied {
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: action.into() }
    }
}

/// Self-or-admin rule shared by every identity-scoped operation.
///
/// A resource without a recorded owner (e.g. a tender whose creator was
/// never set) can only be touched by an admin.
pub fn is_self_or_admin(actor: &Actor, owner_id: Option<i32>) -> bool {
    actor.role.is_admin() || owner_id == Some(actor.id)
}

pub fn ensure_self_or_admin(actor: &Actor, owner_id: Option<i32>, action: &str) -> Result<(), AccessDenied> {
    if is_self_or_admin(actor, owner_id) {
        Ok(())
    } else {
        tracing::debug!(
            "actor {} ({}) denied: {} owned by {:?}",
            actor.id,
            actor.role,
            action,
            owner_id
        );
        Err(AccessDenied::new(action))
    }
}
