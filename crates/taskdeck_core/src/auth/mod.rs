//! Authentication seam and session gating.
//!
//! # Responsibility
//! - Define the external auth-provider contract (subscribe + sign-out).
//! - Resolve the current identity and redirect unauthenticated callers.
//!
//! # Invariants
//! - Dependents only ever see identity through the narrow
//!   `IdentitySource` interface.
//! - Each signed-out transition triggers exactly one `/login` redirect.

pub mod provider;
pub mod session_gate;
