// handlers/mod.rs - request handlers, split by authentication tier
//
// Public (no auth) → Protected (bearer token required, or optional where noted)
pub mod protected;
pub mod public;
pub mod validation;

pub use protected::*;
pub use public::*;
