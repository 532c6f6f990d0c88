//! Wire payloads of the Omeka S item API.
//!
//! Requests are typed here and serialized by hand where the JSON shape uses
//! keys (`o:resource_class`, `@id`, `@value`) that do not map onto Rust fields.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One value of an item property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDescriptor {
    /// Link to another item of the same catalog
    Resource(u64),
    /// External IRI
    Uri(String),
    /// Plain text
    Literal(String),
}

impl ValueDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            ValueDescriptor::Resource(_) => "resource",
            ValueDescriptor::Uri(_) => "uri",
            ValueDescriptor::Literal(_) => "literal",
        }
    }
}

impl Serialize for ValueDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", self.kind())?;
        map.serialize_entry("property_id", "auto")?;
        match self {
            ValueDescriptor::Resource(id) => map.serialize_entry("value_resource_id", id)?,
            ValueDescriptor::Uri(iri) => map.serialize_entry("@id", iri)?,
            ValueDescriptor::Literal(text) => map.serialize_entry("@value", text)?,
        }
        map.end()
    }
}

/// Ordered property -> values payload of a patch request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    properties: Vec<(String, Vec<ValueDescriptor>)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `name` exists (possibly empty) and return its value list
    pub fn property_mut(&mut self, name: &str) -> &mut Vec<ValueDescriptor> {
        let slot = match self.properties.iter().position(|(n, _)| n == name) {
            Some(slot) => slot,
            None => {
                self.properties.push((name.to_string(), Vec::new()));
                self.properties.len() - 1
            }
        };
        &mut self.properties[slot].1
    }

    pub fn push(&mut self, name: &str, value: ValueDescriptor) {
        self.property_mut(name).push(value);
    }

    pub fn get(&self, name: &str) -> Option<&[ValueDescriptor]> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ValueDescriptor> {
        self.properties.iter().flat_map(|(_, values)| values.iter())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (name, values) in &self.properties {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Body of an item create request: the class and nothing else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassAssignment {
    pub class_id: Option<u64>,
}

impl Serialize for ClassAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ClassRef {
            #[serde(rename = "o:id")]
            id: Option<u64>,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("o:resource_class", &ClassRef { id: self.class_id })?;
        map.end()
    }
}

/// Resource class definition as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceClass {
    #[serde(rename = "o:id")]
    pub id: u64,
    /// Qualified term, e.g. `crm:E22_Human-Made_Object`
    #[serde(rename = "o:term")]
    pub term: String,
}

/// One page of the resource class listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceClassPage {
    /// Total number of classes in the catalog, regardless of page size
    pub total: u64,
    pub classes: Vec<ResourceClass>,
}

/// Create response; only the id is read
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedItem {
    #[serde(rename = "o:id")]
    pub id: u64,
}
