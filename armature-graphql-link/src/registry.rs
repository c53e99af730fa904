//! Named links.

use std::collections::HashMap;

use crate::{HttpLink, LinkError, Result};

/// Name of the fallback link.
pub const DEFAULT_CLIENT: &str = "default";

/// Links keyed by name, with a required `default` entry.
#[derive(Clone)]
pub struct LinkRegistry {
    default: HttpLink,
    named: HashMap<String, HttpLink>,
}

impl LinkRegistry {
    /// Create a registry with only the default link.
    pub fn new(default: HttpLink) -> Self {
        Self {
            default,
            named: HashMap::new(),
        }
    }

    /// Create a registry from a map that must contain a `default` entry.
    pub fn from_map(mut links: HashMap<String, HttpLink>) -> Result<Self> {
        let default = links
            .remove(DEFAULT_CLIENT)
            .ok_or(LinkError::MissingDefaultClient)?;
        Ok(Self {
            default,
            named: links,
        })
    }

    /// Register a link under a name. Registering `default` replaces the default.
    pub fn with_client(mut self, name: impl Into<String>, link: HttpLink) -> Self {
        let name = name.into();
        if name == DEFAULT_CLIENT {
            self.default = link;
        } else {
            self.named.insert(name, link);
        }
        self
    }

    /// Get the default link.
    pub fn default_client(&self) -> &HttpLink {
        &self.default
    }

    /// Get a link by name.
    pub fn get(&self, name: &str) -> Option<&HttpLink> {
        if name == DEFAULT_CLIENT {
            Some(&self.default)
        } else {
            self.named.get(name)
        }
    }

    /// Get a link by name, failing if it is not registered.
    pub fn use_client(&self, name: &str) -> Result<&HttpLink> {
        self.get(name)
            .ok_or_else(|| LinkError::UnknownClient(name.to_string()))
    }

    /// Check if a link is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over registered names, `default` included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DEFAULT_CLIENT).chain(self.named.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::RecordingTransport;
    use crate::HttpLinkConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn link(uri: &str) -> HttpLink {
        HttpLink::with_transport(
            HttpLinkConfig::new(uri),
            Arc::new(RecordingTransport::new(json!({}))),
        )
    }

    fn uri(link: &HttpLink) -> Option<&str> {
        link.config().uri.as_deref()
    }

    #[test]
    fn test_from_map_requires_default() {
        let mut links = HashMap::new();
        links.insert("admin".to_string(), link("/admin"));

        assert!(matches!(
            LinkRegistry::from_map(links),
            Err(LinkError::MissingDefaultClient)
        ));
    }

    #[test]
    fn test_lookup() {
        let mut links = HashMap::new();
        links.insert("default".to_string(), link("/graphql"));
        links.insert("admin".to_string(), link("/admin"));
        let registry = LinkRegistry::from_map(links).unwrap();

        assert_eq!(uri(registry.default_client()), Some("/graphql"));
        assert_eq!(uri(registry.get("default").unwrap()), Some("/graphql"));
        assert_eq!(uri(registry.use_client("admin").unwrap()), Some("/admin"));
        assert!(matches!(
            registry.use_client("missing"),
            Err(LinkError::UnknownClient(name)) if name == "missing"
        ));

        let mut names: Vec<_> = registry.names().collect();
        names.sort();
        assert_eq!(names, vec!["admin", "default"]);
    }

    #[test]
    fn test_with_client() {
        let registry = LinkRegistry::new(link("/one"))
            .with_client("reports", link("/reports"))
            .with_client("default", link("/two"));

        assert_eq!(uri(registry.default_client()), Some("/two"));
        assert!(registry.contains("reports"));
        assert!(!registry.contains("admin"));
    }
}
