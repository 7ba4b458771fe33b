//! Request extractors that fail with [`ApiError`] instead of axum's plain-text rejections

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use uuid::Uuid;

use super::error::ApiError;

/// JSON body; any decode failure is 400 "Invalid request body"
///
/// A body cut off by the size limit is 413 instead.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                let mut error = ApiError::payload_too_large();
                error.internal = Some(rejection.body_text());
                Err(error)
            }
            Err(rejection) => {
                let mut error = ApiError::bad_request("Invalid request body");
                error.internal = Some(rejection.body_text());
                Err(error)
            }
        }
    }
}

/// Parse a path segment as a UUID, naming the entity in the error
///
/// ```rust
/// use cms_service::handlers::parse_uuid;
///
/// let error = parse_uuid("42", "post").unwrap_err();
/// assert_eq!(error.message, "Invalid post ID");
/// ```
pub fn parse_uuid(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {entity} ID")))
}

/// Where a request came from, captured for contact submissions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client address, present only when it is a valid IP
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// First `X-Forwarded-For` entry, else `X-Real-IP`, else the peer address
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let candidate = header_value("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .or_else(|| header_value("x-real-ip").map(str::to_string))
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        let ip_address = candidate.filter(|ip| ip.parse::<IpAddr>().is_ok());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            ip_address,
            user_agent,
        }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.9:51000".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let info = ClientInfo::from_headers(
            &headers(&[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("x-real-ip", "198.51.100.2"),
            ]),
            peer(),
        );
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_then_peer() {
        let info = ClientInfo::from_headers(&headers(&[("x-real-ip", "2001:db8::1")]), peer());
        assert_eq!(info.ip_address.as_deref(), Some("2001:db8::1"));

        let info = ClientInfo::from_headers(&HeaderMap::new(), peer());
        assert_eq!(info.ip_address.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_invalid_address_is_dropped() {
        let info = ClientInfo::from_headers(&headers(&[("x-forwarded-for", "unknown")]), peer());
        assert_eq!(info.ip_address, None);
    }

    #[test]
    fn test_user_agent() {
        let info = ClientInfo::from_headers(&headers(&[("user-agent", "curl/8.5.0")]), None);
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.5.0"));
        assert_eq!(info.ip_address, None);
    }

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "tag").unwrap(), id);
        assert_eq!(
            parse_uuid("nope", "content type").unwrap_err().message,
            "Invalid content type ID"
        );
    }
}
