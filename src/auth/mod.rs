//! # Authentication & Role Model
//!
//! Everything about *who* is calling: the closed role set and its
//! capability predicates, the per-request [`Identity`], the
//! [`SessionGuard`] choke point, session token issuance/verification, and
//! password hashing for the login path.

pub mod identity;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;

pub use crate::constants::Role;
pub use identity::Identity;
pub use password::{hash_password, verify_password};
pub use session::SessionGuard;
pub use token::{JwtVerifier, SessionClaims, TokenError, TokenVerifier};
