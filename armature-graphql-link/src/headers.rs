//! Header composition and client awareness.
//!
//! Headers are gathered from several configuration levels (link defaults,
//! per-operation context) and merged with [`compose`]. Client identity is then
//! surfaced to the server through the `apollographql-client-*` headers with
//! [`with_client_awareness`], which never overrides anything the caller set.

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Header carrying the client name.
pub const CLIENT_NAME_HEADER: &str = "apollographql-client-name";

/// Header carrying the client version.
pub const CLIENT_VERSION_HEADER: &str = "apollographql-client-version";

/// Client identity reported to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAwareness {
    /// Client name, sent as `apollographql-client-name`.
    #[serde(default)]
    pub name: Option<String>,
    /// Client version, sent as `apollographql-client-version`.
    #[serde(default)]
    pub version: Option<String>,
}

impl ClientAwareness {
    /// Create a client identity with a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }

    /// Set the client name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the client version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Merge `overrides` on top of `base`.
///
/// Every header name present in `overrides` replaces all values of that name
/// in `base`; multi-valued headers keep every value from `overrides`. Names
/// only present in `base` are left untouched. When either side is absent the
/// other one is returned as-is.
pub fn compose(base: Option<HeaderMap>, overrides: Option<HeaderMap>) -> Option<HeaderMap> {
    match (base, overrides) {
        (Some(mut base), Some(overrides)) => {
            for name in overrides.keys() {
                base.remove(name);
                for value in overrides.get_all(name) {
                    base.append(name.clone(), value.clone());
                }
            }
            Some(base)
        }
        (base, overrides) => overrides.or(base),
    }
}

/// Derive `apollographql-client-*` headers from the client identity.
///
/// A derived header is only written when the caller has not already set a
/// header of the same name.
pub fn with_client_awareness(
    mut headers: HeaderMap,
    identity: Option<&ClientAwareness>,
) -> HeaderMap {
    if let Some(identity) = identity {
        set_if_absent(&mut headers, CLIENT_NAME_HEADER, identity.name.as_deref());
        set_if_absent(&mut headers, CLIENT_VERSION_HEADER, identity.version.as_deref());
    }
    headers
}

fn set_if_absent(headers: &mut HeaderMap, name: &'static str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };

    if headers.contains_key(name) {
        trace!(header = name, "Keeping caller-supplied client header");
        return;
    }

    match HeaderValue::from_str(value) {
        Ok(value) => {
            trace!(header = name, "Deriving client header");
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(e) => warn!(header = name, error = %e, "Skipping invalid client header value"),
    }
}

/// Pick the first value that was provided.
///
/// Values are listed from the most specific configuration level to the least
/// specific one. If none is provided the last value (itself unset) is
/// returned, so the result is `None`.
///
/// ```
/// use armature_graphql_link::prioritize;
///
/// assert_eq!(prioritize([None, Some("link"), Some("default")]), Some("link"));
/// assert_eq!(prioritize::<&str, _>([None, None]), None);
/// ```
pub fn prioritize<T, I>(values: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    values.into_iter().flatten().next()
}

/// Insert a header given as strings, ignoring names or values that are not
/// valid HTTP.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => warn!(header = name, "Ignoring invalid header"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_compose_override_wins() {
        let base = headers(&[("authorization", "Bearer a"), ("x-trace", "1")]);
        let overrides = headers(&[("authorization", "Bearer b")]);

        let merged = compose(Some(base), Some(overrides)).unwrap();
        assert_eq!(merged.get("authorization").unwrap(), "Bearer b");
        assert_eq!(merged.get("x-trace").unwrap(), "1");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_compose_replaces_all_values_of_multi_valued_header() {
        let base = headers(&[("accept", "a"), ("accept", "b")]);
        let overrides = headers(&[("accept", "c"), ("accept", "d")]);

        let merged = compose(Some(base), Some(overrides)).unwrap();
        let values: Vec<_> = merged.get_all("accept").iter().collect();
        assert_eq!(values, vec!["c", "d"]);
    }

    #[test]
    fn test_compose_with_absent_side() {
        let a = headers(&[("x-a", "1")]);
        assert_eq!(compose(Some(a.clone()), None), Some(a.clone()));
        assert_eq!(compose(None, Some(a.clone())), Some(a.clone()));
        assert_eq!(compose(None, None), None);
    }

    #[test]
    fn test_compose_with_empty_side() {
        let a = headers(&[("x-a", "1"), ("x-b", "2")]);
        assert_eq!(compose(Some(a.clone()), Some(HeaderMap::new())), Some(a.clone()));
        assert_eq!(compose(Some(HeaderMap::new()), Some(a.clone())), Some(a));
    }

    #[test]
    fn test_compose_is_idempotent() {
        let a = headers(&[("x-a", "1"), ("accept", "a"), ("accept", "b")]);
        assert_eq!(compose(Some(a.clone()), Some(a.clone())), Some(a));
    }

    #[test]
    fn test_client_awareness_sets_missing_headers() {
        let identity = ClientAwareness::new("web", "1.2.0");
        let result = with_client_awareness(HeaderMap::new(), Some(&identity));

        assert_eq!(result.get(CLIENT_NAME_HEADER).unwrap(), "web");
        assert_eq!(result.get(CLIENT_VERSION_HEADER).unwrap(), "1.2.0");
    }

    #[test]
    fn test_client_awareness_never_overwrites() {
        let caller = headers(&[
            ("apollographql-client-name", "custom"),
            ("apollographql-client-version", "9"),
        ]);
        let identity = ClientAwareness::new("web", "1.2.0");
        let result = with_client_awareness(caller.clone(), Some(&identity));

        assert_eq!(result, caller);
    }

    #[test]
    fn test_client_awareness_fields_are_independent() {
        let caller = headers(&[("apollographql-client-name", "custom")]);
        let identity = ClientAwareness::new("web", "1.2.0");
        let result = with_client_awareness(caller, Some(&identity));

        assert_eq!(result.get(CLIENT_NAME_HEADER).unwrap(), "custom");
        assert_eq!(result.get(CLIENT_VERSION_HEADER).unwrap(), "1.2.0");
    }

    #[test]
    fn test_client_awareness_skips_empty_and_invalid_values() {
        let identity = ClientAwareness::default().name("").version("bad\nvalue");
        let result = with_client_awareness(HeaderMap::new(), Some(&identity));
        assert!(result.is_empty());

        let result = with_client_awareness(HeaderMap::new(), None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_prioritize() {
        assert_eq!(prioritize([Some(1), Some(2), Some(3)]), Some(1));
        assert_eq!(prioritize([None, Some(2), Some(3)]), Some(2));
        assert_eq!(prioritize([None, None, Some(3)]), Some(3));
        assert_eq!(prioritize::<i32, _>([None, None, None]), None);
        // An explicit empty value is not "unset".
        assert_eq!(prioritize([Some(""), Some("fallback")]), Some(""));
    }

    #[test]
    fn test_insert_header_ignores_invalid() {
        let mut map = HeaderMap::new();
        insert_header(&mut map, "x-ok", "yes");
        insert_header(&mut map, "bad header", "no");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "yes");
    }
}
