// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (bearer JWT, `AuthUser` in request extensions)
pub mod public;
pub mod protected;
