//! Header filtering between the caller, the gateway and the backends.

use axum::http::{HeaderMap, HeaderName, header};

pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_USERNAME: HeaderName = HeaderName::from_static("x-username");
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");

// RFC 9110 §7.6.1 connection-specific fields, plus the legacy `keep-alive`.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Drop every identity header, whoever set it.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in [X_USER_ID, X_USERNAME, X_USER_ROLE] {
        headers.remove(name);
    }
}

/// Headers to send upstream: the caller's, minus hop-by-hop fields, `host`,
/// `content-length` (the client recomputes both) and any identity header.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = without_hop_by_hop(inbound);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    strip_identity_headers(&mut headers);
    headers
}

/// Headers to relay back to the caller from a backend response.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    without_hop_by_hop(upstream)
}

fn without_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    // Fields listed in `Connection` are connection-specific as well.
    let listed: Vec<HeaderName> = source
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut headers = source.clone();
    for name in HOP_BY_HOP.iter().chain(listed.iter()) {
        headers.remove(name);
    }
    headers
}
