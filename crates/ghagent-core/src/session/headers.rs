//! Per-session request headers

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use super::error::{SessionError, SessionResult};

pub const HEADER_SESSION_ID: &str = "X-Session-ID";
pub const HEADER_REQUEST_ID: &str = "X-Request-ID";
pub const HEADER_PROTOCOL_VERSION: &str = "MCP-Protocol-Version";
pub const ACCEPT_STREAMABLE: &str = "text/event-stream, application/json";

/// Header set attached to one connection
///
/// Configured headers come first; the protocol version, session id and a
/// fresh request id are layered on top and win over configured values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeaders {
    entries: BTreeMap<String, String>,
}

impl SessionHeaders {
    pub fn build(base: &BTreeMap<String, String>, protocol_version: &str, session_id: &str) -> Self {
        let mut entries: BTreeMap<String, String> = base.clone();
        let fixed = [
            ("Accept", ACCEPT_STREAMABLE.to_string()),
            (HEADER_PROTOCOL_VERSION, protocol_version.to_string()),
            (HEADER_SESSION_ID, session_id.to_string()),
            (HEADER_REQUEST_ID, Uuid::new_v4().to_string()),
        ];
        for (name, value) in fixed {
            entries.retain(|k, _| !k.eq_ignore_ascii_case(name));
            entries.insert(name.to_string(), value);
        }
        Self { entries }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get(HEADER_SESSION_ID)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get(HEADER_REQUEST_ID)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }

    /// Convert for use as reqwest default headers
    pub fn to_header_map(&self) -> SessionResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.entries {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SessionError::invalid_header(name.clone(), e))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| SessionError::invalid_header(name.clone(), e))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_layers_fixed_headers() {
        let mut base = BTreeMap::new();
        base.insert("Authorization".to_string(), "Bearer abc".to_string());
        base.insert("x-session-id".to_string(), "stale".to_string());

        let headers = SessionHeaders::build(&base, "2025-03-26", "session-1");
        assert_eq!(headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("mcp-protocol-version"), Some("2025-03-26"));
        assert_eq!(headers.session_id(), Some("session-1"));
        assert_eq!(headers.get("Accept"), Some(ACCEPT_STREAMABLE));
        assert_eq!(headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case(HEADER_SESSION_ID)).count(), 1);
    }

    #[test]
    fn test_request_id_is_fresh() {
        let base = BTreeMap::new();
        let a = SessionHeaders::build(&base, "2025-03-26", "s");
        let b = SessionHeaders::build(&base, "2025-03-26", "s");
        assert_ne!(a.request_id(), b.request_id());
        assert!(Uuid::parse_str(a.request_id().unwrap()).is_ok());
    }

    #[test]
    fn test_header_map_conversion() {
        let headers = SessionHeaders::build(&BTreeMap::new(), "2025-03-26", "s");
        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get("x-session-id").unwrap(), "s");

        let mut bad = BTreeMap::new();
        bad.insert("bad header".to_string(), "v".to_string());
        let err = SessionHeaders::build(&bad, "2025-03-26", "s").to_header_map().unwrap_err();
        assert!(matches!(err, SessionError::InvalidHeader { .. }));
    }
}
