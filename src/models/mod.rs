pub mod subscription;
pub mod tender;
pub mod user;
pub mod validation;

pub use subscription::{SubscribedTender, Subscription, SubscriptionRequest};
pub use tender::{Tender, TenderDraft, TenderInput, TITLE_MAX_CHARS};
pub use user::{AuthenticatedUser, MIN_PASSWORD_LENGTH, ChangePasswordRequest, LoginRequest, Profile, ProfileUpdate, RegisterRequest};
pub use validation::ValidationError;
