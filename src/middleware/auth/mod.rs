//! Per-route authentication policy.

mod bearer;
mod policy;

pub use bearer::{AuthFailure, authenticate, bearer_token};
pub use policy::apply;
