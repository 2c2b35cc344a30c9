pub mod extract;
pub mod format;
pub mod router;

pub use extract::{ApiJson, ApiPath, OptionalJson};
pub use router::{app, AppState};
