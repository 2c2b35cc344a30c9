use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::models::{SubscribedTender, Subscription, Tender};
use crate::types::SuccessResponse;

/// 201 with the created resource as body
pub fn created<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

pub fn success() -> Json<SuccessResponse> {
    Json(SuccessResponse::ok())
}

/// Pairs each subscription with its tender, keeping subscription order.
/// A subscription whose tender is gone gets `tender: null`.
pub fn subscriptions_with_tenders(subscriptions: Vec<Subscription>, tenders: &[Tender]) -> Vec<SubscribedTender> {
    let by_id: HashMap<i32, &Tender> = tenders.iter().map(|t| (t.id, t)).collect();
    subscriptions
        .into_iter()
        .map(|subscription| {
            let tender = by_id.get(&subscription.tender_id).map(|t| (*t).clone());
            SubscribedTender { subscription, tender }
        })
        .collect()
}

/// Document served at `GET /`
pub fn api_info() -> Value {
    json!({
        "success": true,
        "data": {
            "name": "Tenders API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Tender listings, search and subscriptions",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/register, /api/auth/login (public)",
                "tenders": "/api/tenders[/:id], /api/tenders/search, /api/tenders/filter (public read, protected write)",
                "subscriptions": "/api/tenders/:id/subscribe, /api/tenders/:id/subscriptions/:user_id (protected)",
                "users": "/api/users/:id[/password|/subscriptions] (protected)",
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_tenders;
    use chrono::Utc;

    fn subscription(id: i32, tender_id: i32) -> Subscription {
        Subscription {
            id,
            tender_id,
            user_id: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_tenders_become_null() {
        let tenders = sample_tenders();
        let list = subscriptions_with_tenders(vec![subscription(1, 3), subscription(2, 99)], &tenders);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].tender.as_ref().map(|t| t.id), Some(3));
        assert!(list[1].tender.is_none());

        let value = serde_json::to_value(&list[1]).unwrap();
        assert!(value["tender"].is_null());
        assert_eq!(value["subscription"]["tenderId"], 99);
    }
}
