//! Mason document model.
//!
//! A [`MasonDocument`] owns three reserved members (`@namespaces`, `@controls`,
//! `@error`) next to arbitrary JSON members. Serialization order is fixed:
//! reserved members first, then plain members sorted by key, so equal inputs
//! always render to equal bytes.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const NAMESPACES_KEY: &str = "@namespaces";
pub const CONTROLS_KEY: &str = "@controls";
pub const ERROR_KEY: &str = "@error";

const ITEMS_KEY: &str = "items";
const JSON_ENCODING: &str = "json";

#[derive(Debug, Error)]
pub enum HypermediaError {
    #[error("`{0}` is a reserved Mason member")]
    ReservedKey(String),
    #[error("{0} controls cannot carry an input schema")]
    InputOnSafeMethod(Method),
    #[error("member `{0}` already holds a non-array value")]
    NotAnArray(String),
    #[error("value does not serialize to a JSON object")]
    NotAnObject,
    #[error("malformed control name `{0}`")]
    MalformedControlName(String),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Only state-changing methods take a request body.
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hypermedia affordance: where to go, how, and (for POST/PUT) what to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub href: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl Control {
    pub fn new(href: impl Into<String>, method: Method) -> Self {
        Self {
            href: href.into(),
            method,
            title: None,
            encoding: None,
            schema: None,
        }
    }

    pub fn get(href: impl Into<String>) -> Self {
        Self::new(href, Method::Get)
    }

    pub fn delete(href: impl Into<String>) -> Self {
        Self::new(href, Method::Delete)
    }

    pub fn post(href: impl Into<String>, schema: Value) -> Self {
        Self::json_input(href, Method::Post, schema)
    }

    pub fn put(href: impl Into<String>, schema: Value) -> Self {
        Self::json_input(href, Method::Put, schema)
    }

    fn json_input(href: impl Into<String>, method: Method, schema: Value) -> Self {
        Self {
            encoding: Some(JSON_ENCODING.to_string()),
            schema: Some(schema),
            ..Self::new(href, method)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach an input description. Rejected for GET and DELETE controls.
    pub fn with_input(
        mut self,
        encoding: impl Into<String>,
        schema: Value,
    ) -> Result<Self, HypermediaError> {
        if !self.method.accepts_input() {
            return Err(HypermediaError::InputOnSafeMethod(self.method));
        }
        self.encoding = Some(encoding.into());
        self.schema = Some(schema);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasonError {
    #[serde(rename = "@message")]
    pub message: String,
    #[serde(rename = "@messages")]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MasonDocument {
    #[serde(rename = "@namespaces", skip_serializing_if = "BTreeMap::is_empty")]
    namespaces: BTreeMap<String, Namespace>,
    #[serde(rename = "@controls", skip_serializing_if = "BTreeMap::is_empty")]
    controls: BTreeMap<String, Control>,
    #[serde(rename = "@error", skip_serializing_if = "Option::is_none")]
    error: Option<MasonError>,
    #[serde(flatten)]
    members: Map<String, Value>,
}

impl MasonDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a document whose plain members are the fields of `value`.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, HypermediaError> {
        let mut document = Self::new();
        match serde_json::to_value(value)? {
            Value::Object(fields) => {
                for (key, field) in fields {
                    document.insert(key, field)?;
                }
                Ok(document)
            }
            _ => Err(HypermediaError::NotAnObject),
        }
    }

    /// Declare (or redeclare) a namespace prefix. Last write wins.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces
            .insert(prefix.into(), Namespace { name: uri.into() });
    }

    /// Insert a control, replacing any previous control of the same name.
    pub fn add_control(&mut self, name: impl Into<String>, control: Control) {
        self.controls.insert(name.into(), control);
    }

    /// Mark the document as an error response. Mason allows several messages;
    /// only the optional single detail is recorded.
    pub fn add_error(&mut self, title: impl Into<String>, details: Option<&str>) {
        self.error = Some(MasonError {
            message: title.into(),
            messages: details.map(str::to_string).into_iter().collect(),
        });
    }

    /// Set a plain member. Reserved `@` members must go through their own API.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), HypermediaError> {
        let key = key.into();
        if matches!(key.as_str(), NAMESPACES_KEY | CONTROLS_KEY | ERROR_KEY) {
            return Err(HypermediaError::ReservedKey(key));
        }
        self.members.insert(key, value);
        Ok(())
    }

    /// Append to the `items` array, creating it on first use.
    pub fn push_item(&mut self, item: MasonDocument) -> Result<(), HypermediaError> {
        let value = serde_json::to_value(item)?;
        match self
            .members
            .entry(ITEMS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(HypermediaError::NotAnArray(ITEMS_KEY.to_string())),
        }
    }

    /// Ensure an `items` member exists even when the collection is empty.
    pub fn ensure_items(&mut self) {
        self.members
            .entry(ITEMS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
    }

    pub fn namespaces(&self) -> &BTreeMap<String, Namespace> {
        &self.namespaces
    }

    pub fn controls(&self) -> &BTreeMap<String, Control> {
        &self.controls
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.get(name)
    }

    pub fn error(&self) -> Option<&MasonError> {
        self.error.as_ref()
    }

    pub fn member(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    pub fn item_count(&self) -> usize {
        match self.members.get(ITEMS_KEY) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, HypermediaError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn namespace_upsert_keeps_last_uri() {
        let mut doc = MasonDocument::new();
        doc.add_namespace("bikinghub", "/first/");
        doc.add_namespace("bikinghub", "/second/");

        assert_eq!(doc.namespaces().len(), 1);
        assert_eq!(doc.namespaces()["bikinghub"].name, "/second/");
    }

    #[test]
    fn control_overwrite_replaces_without_merging() {
        let mut doc = MasonDocument::new();
        doc.add_control(
            "edit",
            Control::put("/api/a/", json!({"type": "object"})).with_title("Edit"),
        );
        doc.add_control("edit", Control::get("/api/b/"));

        let control = doc.control("edit").expect("control present");
        assert_eq!(control.href, "/api/b/");
        assert_eq!(control.method, Method::Get);
        assert!(control.title.is_none());
        assert!(control.schema.is_none());
        assert!(control.encoding.is_none());
    }

    #[test]
    fn input_is_rejected_on_get_and_delete() {
        let schema = json!({"type": "object"});
        assert!(matches!(
            Control::get("/x/").with_input("json", schema.clone()),
            Err(HypermediaError::InputOnSafeMethod(Method::Get))
        ));
        assert!(matches!(
            Control::delete("/x/").with_input("json", schema.clone()),
            Err(HypermediaError::InputOnSafeMethod(Method::Delete))
        ));
        let put = Control::new("/x/", Method::Put)
            .with_input("json", schema)
            .expect("PUT accepts input");
        assert_eq!(put.encoding.as_deref(), Some("json"));
    }

    #[test]
    fn error_document_shape() {
        let mut doc = MasonDocument::new();
        doc.add_error("Not found", Some("no such favourite"));
        doc.add_control("profile", Control::get("/bikinghub/profiles/error/"));

        let value = serde_json::to_value(&doc).expect("serializes");
        assert_eq!(
            value,
            json!({
                "@controls": {
                    "profile": {"href": "/bikinghub/profiles/error/", "method": "GET"}
                },
                "@error": {"@message": "Not found", "@messages": ["no such favourite"]}
            })
        );
    }

    #[test]
    fn error_without_detail_has_empty_messages() {
        let mut doc = MasonDocument::new();
        doc.add_error("Forbidden", None);
        assert!(doc.error().expect("error set").messages.is_empty());
    }

    #[test]
    fn reserved_members_cannot_be_inserted() {
        let mut doc = MasonDocument::new();
        for key in [NAMESPACES_KEY, CONTROLS_KEY, ERROR_KEY] {
            assert!(matches!(
                doc.insert(key, json!({})),
                Err(HypermediaError::ReservedKey(_))
            ));
        }
    }

    #[test]
    fn rendering_is_byte_identical_for_identical_inputs() {
        let build = || {
            let mut doc = MasonDocument::new();
            doc.add_namespace("bikinghub", "/bikinghub/link-relations/");
            doc.add_control("self", Control::get("/api/locations/"));
            doc.add_control(
                "bikinghub:location-add",
                Control::post("/api/locations/", json!({"type": "object"})),
            );
            let mut item = MasonDocument::new();
            item.insert("name", json!("Oulu")).expect("plain member");
            doc.push_item(item).expect("items array");
            doc.to_bytes().expect("serializes")
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn reserved_members_render_before_plain_members() {
        let mut doc = MasonDocument::new();
        doc.insert("a", json!(1)).expect("plain member");
        doc.add_control("self", Control::get("/api/"));
        doc.add_namespace("ns", "/ns/");

        let text = String::from_utf8(doc.to_bytes().expect("serializes").to_vec())
            .expect("utf-8");
        assert_eq!(
            text,
            r#"{"@namespaces":{"ns":{"name":"/ns/"}},"@controls":{"self":{"href":"/api/","method":"GET"}},"a":1}"#
        );
    }

    #[test]
    fn push_item_refuses_non_array_member() {
        let mut doc = MasonDocument::new();
        doc.insert("items", json!("oops")).expect("plain member");
        assert!(matches!(
            doc.push_item(MasonDocument::new()),
            Err(HypermediaError::NotAnArray(_))
        ));
    }

    #[test]
    fn from_serializable_requires_object() {
        assert!(matches!(
            MasonDocument::from_serializable(&42),
            Err(HypermediaError::NotAnObject)
        ));
        let doc = MasonDocument::from_serializable(&json!({"id": 3})).expect("object");
        assert_eq!(doc.member("id"), Some(&json!(3)));
    }
}
