//! Services backed by a `KeyValueStore`, seeded with demo data on first use.
//!
//! Each collection lives under its own key as a JSON array, with a sibling
//! `next*Id` counter. Mutations hold a write lock for their whole
//! read-modify-write cycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use super::store::{get_json, set_json, KeyValueStore, Session};
use super::{TenderService, UserService};
use crate::api::format::subscriptions_with_tenders;
use crate::auth::{ensure_self_or_admin, hash_password, verify_password, Actor};
use crate::filter::{Filter, QueryMode, TenderQuery};
use crate::models::{
    AuthenticatedUser, ChangePasswordRequest, Profile, ProfileUpdate, RegisterRequest, SubscribedTender,
    Subscription, Tender, TenderInput, MIN_PASSWORD_LENGTH,
};
use crate::seed::{demo_tenders, DEMO_USERS};
use crate::types::Role;

const TENDERS_KEY: &str = "tenders";
const NEXT_TENDER_ID_KEY: &str = "nextTenderId";
const SUBSCRIPTIONS_KEY: &str = "subscriptions";
const NEXT_SUBSCRIPTION_ID_KEY: &str = "nextSubscriptionId";
const USERS_KEY: &str = "users";
const NEXT_USER_ID_KEY: &str = "nextUserId";

/// Owner of the seeded tenders (the demo admin, first seeded user)
const SEED_OWNER_ID: i32 = 1;

/// Account record as kept in the local store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUser {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl LocalUser {
    pub fn to_profile(&self) -> Profile {
        Profile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
        }
    }
}

/// Shared state of the local services: storage, session and write lock
pub struct LocalDatabase {
    store: Arc<dyn KeyValueStore>,
    session: Session,
    delay: Duration,
    write_lock: Mutex<()>,
}

impl LocalDatabase {
    pub fn new(store: Arc<dyn KeyValueStore>, delay: Duration) -> Self {
        Self {
            session: Session::new(store.clone()),
            store,
            delay,
            write_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Simulated network latency
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn next_id(&self, key: &str, default: i32) -> ServiceResult<i32> {
        let id = get_json::<i32>(self.store.as_ref(), key)?.unwrap_or(default);
        set_json(self.store.as_ref(), key, &(id + 1))?;
        Ok(id)
    }

    fn tenders(&self) -> ServiceResult<Vec<Tender>> {
        if let Some(tenders) = get_json(self.store.as_ref(), TENDERS_KEY)? {
            return Ok(tenders);
        }
        let seeded = demo_tenders(SEED_OWNER_ID)?;
        tracing::debug!("seeding local store with {} tenders", seeded.len());
        self.save_tenders(&seeded)?;
        set_json(self.store.as_ref(), NEXT_TENDER_ID_KEY, &(seeded.len() as i32 + 1))?;
        Ok(seeded)
    }

    fn save_tenders(&self, tenders: &[Tender]) -> ServiceResult<()> {
        set_json(self.store.as_ref(), TENDERS_KEY, tenders)
    }

    fn users(&self) -> ServiceResult<Vec<LocalUser>> {
        if let Some(users) = get_json(self.store.as_ref(), USERS_KEY)? {
            return Ok(users);
        }
        let now = Utc::now();
        let seeded = DEMO_USERS
            .iter()
            .zip(1..)
            .map(|(demo, id)| -> ServiceResult<LocalUser> {
                Ok(LocalUser {
                    id,
                    email: demo.email.to_string(),
                    password_hash: hash_password(demo.password)?,
                    full_name: demo.full_name.to_string(),
                    role: demo.role,
                    created_at: now,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;
        tracing::debug!("seeding local store with {} users", seeded.len());
        self.save_users(&seeded)?;
        set_json(self.store.as_ref(), NEXT_USER_ID_KEY, &(seeded.len() as i32 + 1))?;
        Ok(seeded)
    }

    fn save_users(&self, users: &[LocalUser]) -> ServiceResult<()> {
        set_json(self.store.as_ref(), USERS_KEY, users)
    }

    fn subscriptions(&self) -> ServiceResult<Vec<Subscription>> {
        Ok(get_json(self.store.as_ref(), SUBSCRIPTIONS_KEY)?.unwrap_or_default())
    }

    fn save_subscriptions(&self, subscriptions: &[Subscription]) -> ServiceResult<()> {
        set_json(self.store.as_ref(), SUBSCRIPTIONS_KEY, subscriptions)
    }

    fn find_tender(&self, id: i32) -> ServiceResult<Tender> {
        self.tenders()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound("Tender not found".into()))
    }

    fn find_user(&self, id: i32) -> ServiceResult<LocalUser> {
        self.users()?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))
    }

    /// Identity of the stored session, re-read from the user list so a
    /// changed role applies immediately
    fn actor(&self) -> ServiceResult<Actor> {
        let current = self
            .session
            .current()?
            .ok_or_else(|| ServiceError::Unauthorized("Not authorized, no token".into()))?;
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.id == current.id)
            .ok_or_else(|| ServiceError::Unauthorized("Not authorized, user not found".into()))?;
        Ok(Actor::new(user.id, user.role))
    }
}

pub struct LocalTenderService {
    db: Arc<LocalDatabase>,
}

impl LocalTenderService {
    pub fn new(db: Arc<LocalDatabase>) -> Self {
        Self { db }
    }

    async fn query(&self, query: &TenderQuery, mode: QueryMode) -> ServiceResult<Vec<Tender>> {
        self.db.pause().await;
        let tenders = self.db.tenders()?;
        Ok(Filter::new(query, mode).apply(tenders.iter()))
    }
}

#[async_trait]
impl TenderService for LocalTenderService {
    async fn get_all_tenders(&self) -> ServiceResult<Vec<Tender>> {
        self.db.pause().await;
        self.db.tenders()
    }

    async fn get_tender_by_id(&self, id: i32) -> ServiceResult<Tender> {
        self.db.pause().await;
        self.db.find_tender(id)
    }

    async fn create_tender(&self, input: &TenderInput) -> ServiceResult<Tender> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        let draft = input.clone().into_draft()?;

        let _guard = self.db.write_lock.lock().await;
        let mut tenders = self.db.tenders()?;
        let id = self.db.next_id(NEXT_TENDER_ID_KEY, tenders.len() as i32 + 1)?;
        let tender = Tender::from_draft(id, draft, Some(actor.id), Utc::now());
        tenders.push(tender.clone());
        self.db.save_tenders(&tenders)?;
        Ok(tender)
    }

    async fn update_tender(&self, id: i32, input: &TenderInput) -> ServiceResult<Tender> {
        self.db.pause().await;
        let actor = self.db.actor()?;

        let _guard = self.db.write_lock.lock().await;
        let mut tenders = self.db.tenders()?;
        let tender = tenders
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound("Tender not found".into()))?;
        ensure_self_or_admin(&actor, tender.created_by, "update this tender")?;

        tender.apply(input)?;
        tender.updated_at = Some(Utc::now());
        let updated = tender.clone();
        self.db.save_tenders(&tenders)?;
        Ok(updated)
    }

    async fn delete_tender(&self, id: i32) -> ServiceResult<()> {
        self.db.pause().await;
        let actor = self.db.actor()?;

        let _guard = self.db.write_lock.lock().await;
        let mut tenders = self.db.tenders()?;
        let existing = tenders
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound("Tender not found".into()))?;
        ensure_self_or_admin(&actor, existing.created_by, "delete this tender")?;

        tenders.retain(|t| t.id != id);
        let previous = self.db.subscriptions()?;
        let remaining: Vec<Subscription> = previous.iter().filter(|s| s.tender_id != id).cloned().collect();

        // Subscriptions first; a failed tender write restores them.
        self.db.save_subscriptions(&remaining)?;
        if let Err(err) = self.db.save_tenders(&tenders) {
            tracing::warn!("deleting local tender {} failed, restoring its subscriptions", id);
            self.db.save_subscriptions(&previous)?;
            return Err(err);
        }
        tracing::debug!(
            "deleted local tender {} ({} subscriptions removed)",
            id,
            previous.len() - remaining.len()
        );
        Ok(())
    }

    async fn search_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>> {
        self.query(query, QueryMode::Search).await
    }

    async fn filter_tenders(&self, query: &TenderQuery) -> ServiceResult<Vec<Tender>> {
        self.query(query, QueryMode::Filter).await
    }

    async fn subscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<Subscription> {
        self.db.pause().await;
        let actor = self.db.actor()?;

        let _guard = self.db.write_lock.lock().await;
        self.db.find_tender(tender_id)?;
        ensure_self_or_admin(&actor, Some(user_id), "subscribe this user")?;
        self.db.find_user(user_id)?;

        let mut subscriptions = self.db.subscriptions()?;
        if subscriptions
            .iter()
            .any(|s| s.tender_id == tender_id && s.user_id == user_id)
        {
            return Err(ServiceError::Conflict("User already subscribed to this tender".into()));
        }

        let now = Utc::now();
        let subscription = Subscription {
            id: self.db.next_id(NEXT_SUBSCRIPTION_ID_KEY, 1)?,
            tender_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        subscriptions.push(subscription.clone());
        self.db.save_subscriptions(&subscriptions)?;
        Ok(subscription)
    }

    async fn unsubscribe_tender(&self, tender_id: i32, user_id: i32) -> ServiceResult<()> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(user_id), "unsubscribe this user")?;

        let _guard = self.db.write_lock.lock().await;
        let mut subscriptions = self.db.subscriptions()?;
        let before = subscriptions.len();
        subscriptions.retain(|s| !(s.tender_id == tender_id && s.user_id == user_id));
        if subscriptions.len() == before {
            return Err(ServiceError::NotFound("Subscription not found".into()));
        }
        self.db.save_subscriptions(&subscriptions)
    }

    async fn get_user_subscriptions(&self, user_id: i32) -> ServiceResult<Vec<SubscribedTender>> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(user_id), "view these subscriptions")?;

        let mut mine: Vec<Subscription> = self
            .db
            .subscriptions()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        mine.sort_by_key(|s| s.id);
        Ok(subscriptions_with_tenders(mine, &self.db.tenders()?))
    }

    async fn is_user_subscribed(&self, tender_id: i32, user_id: i32) -> ServiceResult<bool> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(user_id), "view these subscriptions")?;

        Ok(self
            .db
            .subscriptions()?
            .iter()
            .any(|s| s.tender_id == tender_id && s.user_id == user_id))
    }
}

pub struct LocalUserService {
    db: Arc<LocalDatabase>,
}

impl LocalUserService {
    pub fn new(db: Arc<LocalDatabase>) -> Self {
        Self { db }
    }

    fn start_session(&self, user: &LocalUser) -> ServiceResult<AuthenticatedUser> {
        let session = AuthenticatedUser::new(user.to_profile(), format!("local-{}", Uuid::new_v4()));
        self.db.session.save(&session)?;
        Ok(session)
    }
}

#[async_trait]
impl UserService for LocalUserService {
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthenticatedUser> {
        self.db.pause().await;
        let email = email.trim().to_ascii_lowercase();
        let invalid = || ServiceError::Unauthorized("Invalid email or password".into());

        let user = self
            .db
            .users()?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("failed local login for {}", email);
            return Err(invalid());
        }
        self.start_session(&user)
    }

    async fn register(&self, request: &RegisterRequest) -> ServiceResult<AuthenticatedUser> {
        self.db.pause().await;
        let request = request.clone().normalized(MIN_PASSWORD_LENGTH)?;

        let _guard = self.db.write_lock.lock().await;
        let mut users = self.db.users()?;
        if users.iter().any(|u| u.email == request.email) {
            return Err(ServiceError::Conflict("User already exists".into()));
        }

        let user = LocalUser {
            id: self.db.next_id(NEXT_USER_ID_KEY, users.len() as i32 + 1)?,
            email: request.email,
            password_hash: hash_password(&request.password)?,
            full_name: request.full_name,
            role: Role::User,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.db.save_users(&users)?;
        self.start_session(&user)
    }

    async fn get_user_profile(&self, id: i32) -> ServiceResult<Profile> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(id), "view this profile")?;
        Ok(self.db.find_user(id)?.to_profile())
    }

    async fn update_user_profile(&self, id: i32, update: &ProfileUpdate) -> ServiceResult<Profile> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(id), "update this profile")?;

        let _guard = self.db.write_lock.lock().await;
        let mut users = self.db.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        let mut profile = user.to_profile();
        update.apply(&mut profile, actor.role.is_admin())?;
        user.full_name = profile.full_name.clone();
        user.role = profile.role;
        self.db.save_users(&users)?;

        // keep the stored session in step with the caller's own profile
        if let Some(current) = self.db.session.current()? {
            if current.id == id {
                self.db
                    .session
                    .save(&AuthenticatedUser::new(profile.clone(), current.token))?;
            }
        }
        Ok(profile)
    }

    async fn change_password(&self, id: i32, request: &ChangePasswordRequest) -> ServiceResult<()> {
        self.db.pause().await;
        let actor = self.db.actor()?;
        ensure_self_or_admin(&actor, Some(id), "change this password")?;
        request.validate(MIN_PASSWORD_LENGTH)?;

        let _guard = self.db.write_lock.lock().await;
        let mut users = self.db.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized("Current password is incorrect".into()));
        }
        user.password_hash = hash_password(&request.new_password)?;
        self.db.save_users(&users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;
    use crate::testing::tender_input;
    use crate::types::TenderStatus;

    struct Fixture {
        db: Arc<LocalDatabase>,
        tenders: LocalTenderService,
        users: LocalUserService,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(LocalDatabase::new(Arc::new(MemoryStore::new()), Duration::ZERO));
        Fixture {
            tenders: LocalTenderService::new(db.clone()),
            users: LocalUserService::new(db.clone()),
            db,
        }
    }

    async fn as_admin(f: &Fixture) -> AuthenticatedUser {
        f.users.login("admin@example.com", "admin123").await.unwrap()
    }

    async fn as_user(f: &Fixture) -> AuthenticatedUser {
        f.users.login("user@example.com", "user123").await.unwrap()
    }

    #[tokio::test]
    async fn first_read_seeds_demo_tenders() {
        let f = fixture();
        let tenders = f.tenders.get_all_tenders().await.unwrap();
        assert_eq!(tenders.len(), 5);
        assert_eq!(f.tenders.get_tender_by_id(3).await.unwrap().status, TenderStatus::Closed);
        assert!(matches!(
            f.tenders.get_tender_by_id(99).await,
            Err(ServiceError::NotFound(m)) if m == "Tender not found"
        ));
    }

    #[tokio::test]
    async fn writes_need_a_session() {
        let f = fixture();
        let input = tender_input("New road", 10.0, "2025-01-01");
        assert!(matches!(
            f.tenders.create_tender(&input).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn created_tenders_get_next_id_and_owner() {
        let f = fixture();
        let user = as_user(&f).await;
        let tender = f
            .tenders
            .create_tender(&tender_input("New road", 10.0, "2025-01-01"))
            .await
            .unwrap();
        assert_eq!(tender.id, 6);
        assert_eq!(tender.created_by, Some(user.id));
        assert_eq!(tender.status, TenderStatus::Open);
        assert_eq!(f.tenders.get_all_tenders().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn invalid_tender_is_rejected_before_storage() {
        let f = fixture();
        as_user(&f).await;
        let err = f
            .tenders
            .create_tender(&TenderInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m == "Please provide a title"));
        assert_eq!(f.tenders.get_all_tenders().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update() {
        let f = fixture();
        as_user(&f).await;
        let update = TenderInput {
            budget: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(
            f.tenders.update_tender(1, &update).await,
            Err(ServiceError::Forbidden(m)) if m == "Not authorized to update this tender"
        ));

        as_admin(&f).await;
        let updated = f.tenders.update_tender(1, &update).await.unwrap();
        assert_eq!(updated.budget, 1.0);
        assert_eq!(updated.title, f.tenders.get_tender_by_id(1).await.unwrap().title);
    }

    #[tokio::test]
    async fn subscribe_rejects_duplicates_and_unknown_targets() {
        let f = fixture();
        let user = as_user(&f).await;

        let sub = f.tenders.subscribe_tender(1, user.id).await.unwrap();
        assert_eq!(sub.id, 1);
        assert!(f.tenders.is_user_subscribed(1, user.id).await.unwrap());
        assert!(matches!(
            f.tenders.subscribe_tender(1, user.id).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            f.tenders.subscribe_tender(42, user.id).await,
            Err(ServiceError::NotFound(m)) if m == "Tender not found"
        ));
        assert!(matches!(
            f.tenders.subscribe_tender(1, 1).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn unsubscribe_twice_is_not_found() {
        let f = fixture();
        let user = as_user(&f).await;
        f.tenders.subscribe_tender(2, user.id).await.unwrap();

        f.tenders.unsubscribe_tender(2, user.id).await.unwrap();
        assert!(!f.tenders.is_user_subscribed(2, user.id).await.unwrap());
        assert!(matches!(
            f.tenders.unsubscribe_tender(2, user.id).await,
            Err(ServiceError::NotFound(m)) if m == "Subscription not found"
        ));
    }

    #[tokio::test]
    async fn deleting_a_tender_drops_its_subscriptions() {
        let f = fixture();
        let user = as_user(&f).await;
        f.tenders.subscribe_tender(1, user.id).await.unwrap();
        f.tenders.subscribe_tender(2, user.id).await.unwrap();

        as_admin(&f).await;
        f.tenders.delete_tender(1).await.unwrap();
        assert!(matches!(f.tenders.get_tender_by_id(1).await, Err(ServiceError::NotFound(_))));

        let listed = f.tenders.get_user_subscriptions(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subscription.tender_id, 2);
        assert!(listed[0].tender.is_some());
    }

    /// Store whose writes to one key fail after `break_writes`
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
        broken: std::sync::atomic::AtomicBool,
    }

    impl FailingStore {
        fn new(failing_key: &'static str) -> Self {
            Self {
                inner: MemoryStore::new(),
                failing_key,
                broken: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn break_writes(&self) {
            self.broken.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> ServiceResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
            if key == self.failing_key && self.broken.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(ServiceError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> ServiceResult<()> {
            self.inner.remove(key)
        }
    }

    async fn delete_with_failing_key(key: &'static str) -> (ServiceResult<()>, bool, usize) {
        let store = Arc::new(FailingStore::new(key));
        let db = Arc::new(LocalDatabase::new(store.clone(), Duration::ZERO));
        let tenders = LocalTenderService::new(db.clone());
        let users = LocalUserService::new(db);

        let admin = users.login("admin@example.com", "admin123").await.unwrap();
        tenders.subscribe_tender(1, admin.id).await.unwrap();

        store.break_writes();
        let result = tenders.delete_tender(1).await;
        let still_exists = tenders.get_tender_by_id(1).await.is_ok();
        let subscribed = tenders.get_user_subscriptions(admin.id).await.unwrap();
        let orphans = subscribed
            .iter()
            .filter(|s| s.subscription.tender_id == 1 && s.tender.is_none())
            .count();
        (result, still_exists, orphans)
    }

    #[tokio::test]
    async fn failed_subscription_write_keeps_the_tender() {
        let (result, still_exists, orphans) = delete_with_failing_key(SUBSCRIPTIONS_KEY).await;
        assert!(matches!(result, Err(ServiceError::Storage(_))));
        assert!(still_exists);
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn failed_tender_write_restores_subscriptions() {
        let store = Arc::new(FailingStore::new(TENDERS_KEY));
        let db = Arc::new(LocalDatabase::new(store.clone(), Duration::ZERO));
        let tenders = LocalTenderService::new(db.clone());
        let users = LocalUserService::new(db);

        let admin = users.login("admin@example.com", "admin123").await.unwrap();
        tenders.subscribe_tender(1, admin.id).await.unwrap();

        store.break_writes();
        let result = tenders.delete_tender(1).await;
        assert!(matches!(result, Err(ServiceError::Storage(_))));
        assert!(tenders.get_tender_by_id(1).await.is_ok());
        assert!(tenders.is_user_subscribed(1, admin.id).await.unwrap());
    }

    #[tokio::test]
    async fn search_and_filter_use_the_shared_predicate() {
        let f = fixture();
        let all = f.tenders.search_tenders(&TenderQuery::default()).await.unwrap();
        assert_eq!(all.len(), 5);

        let query = TenderQuery {
            status: Some("Closed".into()),
            ..Default::default()
        };
        let closed = f.tenders.filter_tenders(&query).await.unwrap();
        assert_eq!(closed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);

        let query = TenderQuery {
            search_term: Some("zzz-nothing".into()),
            ..Default::default()
        };
        assert!(f.tenders.search_tenders(&query).await.unwrap().is_empty());
        assert_eq!(f.tenders.filter_tenders(&query).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn register_assigns_user_role_and_rejects_duplicates() {
        let f = fixture();
        let request = RegisterRequest {
            email: " New@Example.com ".into(),
            password: "secret1".into(),
            full_name: "New Person".into(),
        };
        let created = f.users.register(&request).await.unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.email, "new@example.com");
        assert_eq!(created.role, Role::User);
        assert_eq!(f.db.session().current().unwrap(), Some(created));

        assert!(matches!(
            f.users.register(&request).await,
            Err(ServiceError::Conflict(m)) if m == "User already exists"
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let f = fixture();
        assert!(matches!(
            f.users.login("admin@example.com", "nope").await,
            Err(ServiceError::Unauthorized(m)) if m == "Invalid email or password"
        ));
        assert!(f.db.session().current().unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_update_refreshes_own_session() {
        let f = fixture();
        let user = as_user(&f).await;
        let update = ProfileUpdate {
            full_name: Some("Renamed".into()),
            role: Some(Role::Admin),
        };
        let profile = f.users.update_user_profile(user.id, &update).await.unwrap();
        assert_eq!(profile.full_name, "Renamed");
        assert_eq!(profile.role, Role::User);

        let session = f.db.session().current().unwrap().unwrap();
        assert_eq!(session.full_name, "Renamed");
        assert_eq!(session.token, user.token);

        assert!(matches!(
            f.users.get_user_profile(1).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn change_password_checks_current_one() {
        let f = fixture();
        let user = as_user(&f).await;
        let wrong = ChangePasswordRequest {
            current_password: "bad".into(),
            new_password: "newpass1".into(),
        };
        assert!(matches!(
            f.users.change_password(user.id, &wrong).await,
            Err(ServiceError::Unauthorized(m)) if m == "Current password is incorrect"
        ));

        let right = ChangePasswordRequest {
            current_password: "user123".into(),
            new_password: "newpass1".into(),
        };
        f.users.change_password(user.id, &right).await.unwrap();
        assert!(f.users.login("user@example.com", "newpass1").await.is_ok());
    }
}
