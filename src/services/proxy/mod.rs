//! Reverse proxy core: route table, header hygiene and the upstream client.

mod forward;
mod headers;
mod routes;

pub use forward::{ForwardError, ProxiedResponse, Upstream};
pub use headers::{
    X_USER_ID, X_USER_ROLE, X_USERNAME, outbound_headers, relayed_headers, strip_identity_headers,
};
pub use routes::{
    AuthRequirement, PathRewrite, RouteError, RoutePolicy, RouteTable, has_dot_segment,
};
