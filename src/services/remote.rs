//! Services that forward every call to the HTTP API.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{ServiceError, ServiceResult};
use super::store::Session;
use super::{TenderService, UserService};
use crate::filter::TenderQuery;
use crate::models::{
    AuthenticatedUser, ChangePasswordRequest, Profile, ProfileUpdate, RegisterRequest, SubscribedTender,
    Subscription, Tender, TenderInput,
};
use crate::types::SuccessResponse;

/// HTTP verb plus a path template under the API base URL. `:name`
/// segments are filled positionally from the call's ids.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

impl Endpoint {
    const fn new(method: Method, path: &'static str) -> Self {
        Self { method, path }
    }

    pub fn resolve(&self, args: &[i32]) -> ServiceResult<String> {
        let mut args = args.iter();
        let mut resolved = Vec::new();
        for segment in self.path.split('/') {
            if segment.starts_with(':') {
                let value = args
                    .next()
                    .ok_or_else(|| ServiceError::Validation(format!("missing value for {} in {}", segment, self.path)))?;
                resolved.push(value.to_string());
            } else {
                resolved.push(segment.to_string());
            }
        }
        Ok(resolved.join("/"))
    }
}

pub mod endpoints {
    use super::{Endpoint, Method};

    pub const GET_ALL_TENDERS: Endpoint = Endpoint::new(Method::GET, "/tenders");
    pub const GET_TENDER: Endpoint = Endpoint::new(Method::GET, "/tenders/:id");
    pub const CREATE_TENDER: Endpoint = Endpoint::new(Method::POST, "/tenders");
    pub const UPDATE_TENDER: Endpoint = Endpoint::new(Method::PUT, "/tenders/:id");
    pub const DELETE_TENDER: Endpoint = Endpoint::new(Method::DELETE, "/tenders/:id");
    pub const SEARCH_TENDERS: Endpoint = Endpoint::new(Method::GET, "/tenders/search");
    pub const FILTER_TENDERS: Endpoint = Endpoint::new(Method::GET, "/tenders/filter");
    pub const SUBSCRIBE: Endpoint = Endpoint::new(Method::POST, "/tenders/:id/subscribe");
    pub const UNSUBSCRIBE: Endpoint = Endpoint::new(Method::DELETE, "/tenders/:id/subscribe");
    pub const IS_SUBSCRIBED: Endpoint = Endpoint::new(Method::GET, "/tenders/:id/subscriptions/:user_id");
    pub const USER_SUBSCRIPTIONS: Endpoint = Endpoint::new(Method::GET, "/users/:id/subscriptions");
    pub const LOGIN: Endpoint = Endpoint::new(Method::POST, "/auth/login");
    pub const REGISTER: Endpoint = Endpoint::new(Method::POST, "/auth/register");
    pub const GET_USER: Endpoint = Endpoint::new(Method::GET, "/users/:id");
    pub const UPDATE_USER: Endpoint = Endpoint::new(Method::PUT, "/users/:id");
    pub const CHANGE_PASSWORD: Endpoint = Endpoint::new(Method::PUT, "/users/:id/password");
}

/// What a call sends besides its path
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Query(Vec<(String, String)>),
    Json(Value),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin reqwest wrapper: base URL, bearer token from the session, error
/// decoding
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        args: &[i32],
        payload: Payload,
    ) -> ServiceResult<T> {
        let url = format!("{}{}", self.base_url, endpoint.resolve(args)?);
        tracing::debug!("{} {}", endpoint.method, url);

        let mut request = self.http.request(endpoint.method.clone(), &url);
        if let Some(token) = self.session.token()? {
            request = request.bearer_auth(token);
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Query(params) => request.query(&params),
            Payload::Json(body) => request.json(&body),
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("{} {} rejected credentials, clearing session", endpoint.method, url);
            self.session.clear()?;
        }
        Err(ServiceError::from_status(status, message))
    }

    async fn acknowledge(&self, endpoint: &Endpoint, args: &[i32], payload: Payload) -> ServiceResult<()> {
        let ack: SuccessResponse = self.call(endpoint, args, payload).await?;
        if !ack.success {
            return Err(ServiceError::Remote {
                status: 200,
                message: format!("{} {} was not acknowledged", endpoint.method, endpoint.path),
            });
        }
        Ok(())
    }
}

pub struct RemoteTenderService {
    client: ApiClient,
}

impl RemoteTenderService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn query_params(pairs: Vec<(String, String)>) -> Payload {
    if pairs.is_empty() {
        Payload::Empty
    } else {
        Payload::Query(pairs)
    }
}

#[async_trait]
impl TenderService for RemoteTenderService {
    async fn get_all_tenders(&self) -> ServiceResult<Vec<Tender>> {
        self.client.call(&endpoints::GET_ALL_TENDERS, &[], Payload::Empty).await
    }

    async fn get_tender_by_id(&self, id: i32) -> ServiceResult<Tender> {
        self.client.call(&endpoints::GET_TENDER, &[id], Payload::Empty).await
    }

    async fn create_tender(&self, input: &TenderInput) -> ServiceResult<Tender> {
        let body = serde_json::to_value(input)?;
        self.client.call(&endpoints::CREATE_TENDER, &[], Payload::Json(body)).await
    }

    async fn update_tender(&self, id: i32, input: &TenderInput) -> ServiceResult<Tender> {
        let body = serde_json::to_value(input)?;
        self.client.call(&endpoints::UPDATE_TENDER, &[id], Payload::Json(body)).await
    }

    async fn delete_tender(&self, id: i32) -> ServiceResult<()> {
        self.client.acknowledge(&endpoints::DELETE_TENDER, &[id], Payload::Empty).await
    }

    async fn search_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>> {
        let payload = query_params(query.to_search_params());
        self.client.call(&endpoints::SEARCH_TENDERS, &[], payload).await
    }

    async fn filter_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>> {
        let payload = query_params(query.to_filter_params());
        self.client.call(&endpoints::FILTER_TENDERS, &[], payload).await
    }

    async fn subscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<Subscription> {
        let body = json!({ "userId": user_id });
        self.client.call(&endpoints::SUBSCRIBE, &[tender_id], Payload::Json(body)).await
    }

    async fn unsubscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<()> {
        let body = json!({ "userId": user_id });
        self.client
            .acknowledge(&endpoints::UNSUBSCRIBE, &[tender_id], Payload::Json(body))
            .await
    }

    async fn get_user_subscriptions(&self, user_id: i32) -> ServiceResult<Vec<SubscribedTender>> {
        self.client.call(&endpoints::USER_SUBSCRIPTIONS, &[user_id], Payload::Empty).await
    }

    async fn is_user_subscribed(&self, tender_id: i32, user_id: i32) -> ServiceResult<bool> {
        self.client
            .call(&endpoints::IS_SUBSCRIBED, &[tender_id, user_id], Payload::Empty)
            .await
    }
}

pub struct RemoteUserService {
    client: ApiClient,
}

impl RemoteUserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn authenticate(&self, endpoint: &Endpoint, body: Value) -> ServiceResult<AuthenticatedUser> {
        let user: AuthenticatedUser = self.client.call(endpoint, &[], Payload::Json(body)).await?;
        self.client.session().save(&user)?;
        Ok(user)
    }
}

#[async_trait]
impl UserService for RemoteUserService {
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthenticatedUser> {
        self.authenticate(&endpoints::LOGIN, json!({ "email": email, "password": password }))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> ServiceResult<AuthenticatedUser> {
        self.authenticate(&endpoints::REGISTER, serde_json::to_value(request)?).await
    }

    async fn get_user_profile(&self, id: i32) -> ServiceResult<Profile> {
        self.client.call(&endpoints::GET_USER, &[id], Payload::Empty).await
    }

    async fn update_user_profile(&self, id: i32, update: &ProfileUpdate) -> ServiceResult<Profile> {
        let body = serde_json::to_value(update)?;
        let profile: Profile = self.client.call(&endpoints::UPDATE_USER, &[id], Payload::Json(body)).await?;

        if let Some(current) = self.client.session().current()? {
            if current.id == id {
                self.client
                    .session()
                    .save(&AuthenticatedUser::new(profile.clone(), current.token))?;
            }
        }
        Ok(profile)
    }

    async fn change_password(&self, id: i32, request: &ChangePasswordRequest) -> ServiceResult<()> {
        let body = serde_json::to_value(request)?;
        self.client
            .acknowledge(&endpoints::CHANGE_PASSWORD, &[id], Payload::Json(body))
            .await
    }
}
