//! Principals, session tokens, and the per-method access rules enforced on every call.

pub mod authorizer;
pub mod id;
pub mod jwt;
pub mod policy;
pub mod secret;
pub mod user;

pub use authorizer::*;
pub use id::*;
pub use jwt::*;
pub use policy::*;
pub use secret::*;
pub use user::*;
