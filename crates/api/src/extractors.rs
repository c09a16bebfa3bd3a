//! Request extractors.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, ConnectInfo, FromRequest, Request},
    http::HeaderMap,
    Json,
};
use serde::de::DeserializeOwned;
use std::net::{IpAddr, SocketAddr};

use crate::response::ApiError;

/// Key used when the peer address is unavailable.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// JSON body whose rejections come back in the API error format.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::validation(vec![rejection.body_text()]).with_message("Invalid request body")
}

/// Identify the caller for rate limiting.
pub fn resolve_client_key(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    client_key(request.headers(), peer, trusted_proxies)
}

/// Peer IP, or the forwarded client when the peer is a trusted proxy.
///
/// From a trusted proxy, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Empty header values fall back to the peer address.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_CLIENT.to_string();
    };
    let peer_ip = peer.ip();

    if trusted_proxies.contains(&peer_ip) {
        let forwarded = headers
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|xff| xff.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = headers
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    peer_ip.to_string()
}
