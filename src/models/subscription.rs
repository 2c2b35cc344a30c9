use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::tender::Tender;

/// A user's interest in one tender; unique per (tender, user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i32,
    pub tender_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of subscribe / unsubscribe calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub user_id: Option<i32>,
}

/// One entry of a user's subscription list. `tender` is `None` when the
/// tender has disappeared since the subscription was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribedTender {
    pub subscription: Subscription,
    pub tender: Option<Tender>,
}
