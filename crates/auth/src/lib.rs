//! `spectr-auth`: authorization context for engine operations.
//!
//! Callers arrive already authenticated; this crate only decides what an
//! `(user, role)` pair may do and which records it may see.

pub mod authorize;
pub mod permissions;
pub mod roles;

pub use authorize::{authorize, Actor, AuthzError};
pub use permissions::Permission;
pub use roles::Role;
