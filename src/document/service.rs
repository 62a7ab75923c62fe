//! Service endpoints advertised by a DID document.

use super::{type_value, types, ID, SERVICE_ENDPOINT, TYPE};
use crate::value::{Map, Value};

/// A service entry of a DID document, held in its raw linked-data form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Service {
    object: Map,
}

impl Service {
    /// Wrap a raw service object.
    #[must_use]
    pub const fn from_object(object: Map) -> Self {
        Self { object }
    }

    /// Create a service from its type(s) and endpoint. Parts that are `None`
    /// are left out of the object.
    #[must_use]
    pub fn build(service_types: Option<&[&str]>, service_endpoint: Option<&str>) -> Self {
        let mut object = Map::new();
        if let Some(service_types) = service_types {
            object.insert(TYPE.to_string(), type_value(service_types));
        }
        if let Some(endpoint) = service_endpoint {
            object.insert(SERVICE_ENDPOINT.to_string(), Value::from_text(endpoint));
        }
        Self { object }
    }

    /// The raw object for inclusion in a DID document.
    #[must_use]
    pub fn to_object(&self) -> Map {
        self.object.clone()
    }

    /// Consume the service, returning its raw object.
    #[must_use]
    pub fn into_object(self) -> Map {
        self.object
    }

    /// Identifier for the service, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.object.get(ID).and_then(Value::as_str)
    }

    /// The service types. A single type is returned as a one-element list.
    #[must_use]
    pub fn types(&self) -> Option<Vec<&str>> {
        types(&self.object)
    }

    /// Location of the service.
    #[must_use]
    pub fn service_endpoint(&self) -> Option<&str> {
        self.object.get(SERVICE_ENDPOINT).and_then(Value::as_str)
    }
}

impl From<Map> for Service {
    fn from(object: Map) -> Self {
        Self::from_object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_read() {
        let service = Service::build(Some(&["AgentService"]), Some("https://agents.example.com/8377464"));

        assert_eq!(service.id(), None);
        assert_eq!(service.types(), Some(vec!["AgentService"]));
        assert_eq!(service.service_endpoint(), Some("https://agents.example.com/8377464"));
        assert!(matches!(service.to_object()["serviceEndpoint"], Value::Uri(_)));
    }

    #[test]
    fn wrong_shapes_read_as_absent() {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::Bool(true));
        object.insert("serviceEndpoint".to_string(), Value::Array(vec![]));

        let service = Service::from_object(object);
        assert_eq!(service.types(), None);
        assert_eq!(service.service_endpoint(), None);
    }
}
