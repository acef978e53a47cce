// src/registry/mod.rs
mod descriptor;

pub use descriptor::{CheckProtocol, ServiceDescriptor};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate service key: {0}")]
    DuplicateKey(String),

    #[error("Service key must not be empty")]
    EmptyKey,
}

/// Fixed set of services, built once at startup and shared read-only.
#[derive(Debug)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
    index: HashMap<String, usize>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(services.len());

        for (position, service) in services.iter().enumerate() {
            if service.key.is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if index.insert(service.key.clone(), position).is_some() {
                return Err(RegistryError::DuplicateKey(service.key.clone()));
            }
        }

        Ok(Self { services, index })
    }

    pub fn lookup(&self, key: &str) -> Option<&ServiceDescriptor> {
        self.index.get(key).map(|&position| &self.services[position])
    }

    /// All services in declaration order.
    pub fn list_all(&self) -> impl Iterator<Item = (&str, &ServiceDescriptor)> {
        self.services.iter().map(|s| (s.key.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Public view of the registry served by `GET /api/services`.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog { registry: self }
    }
}

pub struct Catalog<'a> {
    registry: &'a ServiceRegistry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry<'a> {
    name: &'a str,
    url: &'a str,
    check_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_component: Option<&'a str>,
}

impl Serialize for Catalog<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Written entry by entry so the object keeps declaration order.
        let mut map = serializer.serialize_map(Some(self.registry.len()))?;
        for (key, service) in self.registry.list_all() {
            let entry = CatalogEntry {
                name: &service.name,
                url: &service.url,
                check_type: service.check.name(),
                check_component: service.check.component(),
            };
            map.serialize_entry(key, &entry)?;
        }
        map.end()
    }
}
