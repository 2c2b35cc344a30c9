//! Client-side service layer.
//!
//! Every operation is declared once on [`TenderService`] or [`UserService`];
//! [`local`] runs it against a persisted key/value store, [`remote`] forwards
//! it to the HTTP API. [`ServiceFactory`] picks one from [`ClientConfig`].
//!
//! [`ClientConfig`]: crate::config::ClientConfig

use async_trait::async_trait;

use crate::filter::TenderQuery;
use crate::models::{
    AuthenticatedUser, ChangePasswordRequest, Profile, ProfileUpdate, RegisterRequest, SubscribedTender,
    Subscription, Tender, TenderInput,
};

pub mod error;
pub mod factory;
pub mod local;
pub mod remote;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use factory::ServiceFactory;
pub use local::{LocalDatabase, LocalTenderService, LocalUserService};
pub use remote::{ApiClient, RemoteTenderService, RemoteUserService};
pub use store::{FileStore, KeyValueStore, MemoryStore, Session};

#[async_trait]
pub trait TenderService: Send + Sync {
    async fn get_all_tenders(&self) -> ServiceResult<Vec<Tender>>;

    async fn get_tender_by_id(&self, id: i32) -> ServiceResult<Tender>;

    async fn create_tender(&self, input: &TenderInput) -> ServiceResult<Tender>;

    /// Partial update; fields absent from `input` keep their value
    async fn update_tender(&self, id: i32, input: &TenderInput) -> ServiceResult<Tender>;

    /// Removes the tender and every subscription to it
    async fn delete_tender(&self, id: i32) -> ServiceResult<()>;

    async fn search_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>>;

    /// Category/status/budget refinement only; text and dates are ignored
    async fn filter_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>>;

    async fn subscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<Subscription>;

    async fn unsubscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<()>;

    async fn get_user_subscriptions(&self, user_id: i32) -> ServiceResult<Vec<SubscribedTender>>;

    async fn is_user_subscribed(&self, tender_id: i32, user_id: i32) -> ServiceResult<bool>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Authenticates and stores the result as the current session
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthenticatedUser>;

    async fn register(&self, request: &RegisterRequest) -> ServiceResult<AuthenticatedUser>;

    async fn get_user_profile(&self, id: i32) -> ServiceResult<Profile>;

    async fn update_user_profile(&self, id: i32, update: &ProfileUpdate) -> ServiceResult<Profile>;

    async fn change_password(&self, id: i32, request: &ChangePasswordRequest) -> ServiceResult<()>;
}
