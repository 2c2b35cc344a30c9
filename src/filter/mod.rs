pub mod types;
pub mod filter;
pub mod filter_where;
pub mod params;

pub use types::*;
pub use filter::Filter;
pub use params::RawParams;
