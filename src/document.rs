//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related to a
//! DID: the subject identifier, the public keys that can be used to verify it
//! and the services that can be used to interact with it.
//!
//! The document is held in its raw linked-data form, an ordered map of terms
//! to values. Accessors read the map leniently: a field with an unexpected
//! shape is reported as absent rather than as an error. Serialization is
//! strict and fails if the merged document cannot be compacted.

mod public_key;
mod service;

use std::fmt::{self, Display, Formatter};
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use self::public_key::PublicKey;
pub use self::service::Service;
use crate::compact::{Compactor, TermCompactor};
use crate::error::Err;
use crate::resources::{self, Resources};
use crate::value::{Map, Uri, Value};
use crate::{tracerr, Result};

/// Term for the DID subject.
pub const ID: &str = "id";
/// Term for the type(s) of a public key or service.
pub const TYPE: &str = "type";
/// Term for the set of services.
pub const SERVICE: &str = "service";
/// Term for a service's location.
pub const SERVICE_ENDPOINT: &str = "serviceEndpoint";
/// Term for the set of public keys.
pub const PUBLIC_KEY: &str = "publicKey";
/// Term for base64-encoded key material.
pub const PUBLIC_KEY_BASE64: &str = "publicKeyBase64";
/// Term for hex-encoded key material.
pub const PUBLIC_KEY_HEX: &str = "publicKeyHex";

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct DidDocument {
    fields: Map,
}

impl DidDocument {
    /// Wrap an already parsed linked-data object. No validation is done here;
    /// accessors check shapes as they read.
    #[must_use]
    pub const fn from_object(fields: Map) -> Self {
        Self { fields }
    }

    /// Create a document from its typed parts.
    ///
    /// The `id` entry is always written, as `null` when `id` is `None`. A
    /// `None` list leaves its entry out entirely, while an empty list is
    /// written as an empty array.
    #[must_use]
    pub fn build(
        id: Option<&str>, public_keys: Option<&[PublicKey]>, services: Option<&[Service]>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert(ID.to_string(), id.map_or(Value::Null, Value::from_text));

        if let Some(public_keys) = public_keys {
            let keys = public_keys.iter().map(|k| Value::Object(k.to_object())).collect();
            fields.insert(PUBLIC_KEY.to_string(), Value::Array(keys));
        }
        if let Some(services) = services {
            let services = services.iter().map(|s| Value::Object(s.to_object())).collect();
            fields.insert(SERVICE.to_string(), Value::Array(services));
        }

        Self { fields }
    }

    /// Parse a document from JSON text.
    ///
    /// A root that is not a JSON object is accepted but yields a document
    /// with no fields.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Decoding`] if the text is not well-formed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => tracerr!(Err::Decoding, "invalid JSON: {e}"),
        };

        match value {
            Value::Object(fields) => Ok(Self::from_object(fields)),
            other => {
                warn!("DID document root is not an object: {other:?}");
                Ok(Self::default())
            }
        }
    }

    /// Parse a document from bytes in the given encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Decoding`] if the bytes are not valid for `encoding` or
    /// do not hold well-formed JSON.
    pub fn from_slice(bytes: &[u8], encoding: Encoding) -> Result<Self> {
        let text = encoding.decode(bytes)?;
        Self::from_json(&text)
    }

    /// Parse a document from a reader producing bytes in the given encoding.
    /// The reader is consumed to the end.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Decoding`] if the reader fails, or as for
    /// [`DidDocument::from_slice`].
    pub fn from_reader(mut reader: impl Read, encoding: Encoding) -> Result<Self> {
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            tracerr!(Err::Decoding, "failed to read DID document: {e}");
        }
        Self::from_slice(&bytes, encoding)
    }

    /// Serialize the document using the process-wide resources installed by
    /// [`resources::init`].
    ///
    /// # Errors
    ///
    /// Returns [`Err::Initialization`] if the resources were never loaded, or
    /// as for [`DidDocument::to_json_with`].
    pub fn to_json(&self) -> Result<String> {
        let resources = resources::get()?;
        self.to_json_with(&resources, &TermCompactor::default())
    }

    /// Serialize the document: the skeleton is copied, the document's fields
    /// are laid over it, and the result is compacted against the context and
    /// pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Compaction`] if the merged document cannot be compacted
    /// or [`Err::Encoding`] if the result cannot be rendered.
    pub fn to_json_with(&self, resources: &Resources, compactor: &impl Compactor) -> Result<String> {
        let mut merged = resources.skeleton().clone();
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }

        let compacted = compactor.compact(&merged, resources.context())?;
        match serde_json::to_string_pretty(&Value::Object(compacted)) {
            Ok(json) => Ok(json),
            Err(e) => tracerr!(Err::Encoding, "failed to render DID document: {e}"),
        }
    }

    /// The DID subject. Present only when the `id` entry holds a URI.
    #[must_use]
    pub fn id(&self) -> Option<&Uri> {
        self.fields.get(ID).and_then(Value::as_uri)
    }

    /// The document's public keys, in document order. Entries that are not
    /// objects are skipped.
    ///
    /// `None` if the `publicKey` entry is missing or is not an array.
    #[must_use]
    pub fn public_keys(&self) -> Option<Vec<PublicKey>> {
        self.objects(PUBLIC_KEY).map(|objects| objects.map(PublicKey::from_object).collect())
    }

    /// The document's services, in document order. Entries that are not
    /// objects are skipped.
    ///
    /// `None` if the `service` entry is missing or is not an array.
    #[must_use]
    pub fn services(&self) -> Option<Vec<Service>> {
        self.objects(SERVICE).map(|objects| objects.map(Service::from_object).collect())
    }

    /// Insert or overwrite a raw field. The value is not checked.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// The raw linked-data fields.
    #[must_use]
    pub const fn fields(&self) -> &Map {
        &self.fields
    }

    /// Mutable access to the raw linked-data fields.
    pub fn fields_mut(&mut self) -> &mut Map {
        &mut self.fields
    }

    /// Consume the document, returning its raw fields.
    #[must_use]
    pub fn into_fields(self) -> Map {
        self.fields
    }

    fn objects<'a>(&'a self, term: &'a str) -> Option<impl Iterator<Item = Map> + 'a> {
        let Some(items) = self.fields.get(term).and_then(Value::as_array) else {
            debug!("{term} is missing or not an array");
            return None;
        };

        Some(items.iter().filter_map(move |item| match item {
            Value::Object(object) => Some(object.clone()),
            other => {
                debug!("skipping {term} entry that is not an object: {other:?}");
                None
            }
        }))
    }
}

impl From<Map> for DidDocument {
    fn from(fields: Map) -> Self {
        Self::from_object(fields)
    }
}

/// Writes [`DidDocument::to_json`].
///
/// A serialization failure is logged and reported as [`fmt::Error`], which
/// makes `to_string()` panic. Use [`DidDocument::to_json`] to handle the error.
impl Display for DidDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|e| {
            tracing::error!("failed to serialize DID document: {e}");
            fmt::Error
        })?;
        f.write_str(&json)
    }
}

/// Character encodings accepted when reading a document from bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, with or without a byte order mark.
    #[default]
    Utf8,

    /// UTF-16, little endian.
    Utf16Le,

    /// UTF-16, big endian.
    Utf16Be,
}

impl Encoding {
    /// Decode `bytes` to text, dropping a leading byte order mark.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Decoding`] if `bytes` are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        let text = match self {
            Self::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(e) => tracerr!(Err::Decoding, "invalid UTF-8: {e}"),
            },
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    tracerr!(Err::Decoding, "UTF-16 input has an odd number of bytes");
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Self::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                match String::from_utf16(&units) {
                    Ok(text) => text,
                    Err(e) => tracerr!(Err::Decoding, "invalid UTF-16: {e}"),
                }
            }
        };

        Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
    }
}

fn types(object: &Map) -> Option<Vec<&str>> {
    match object.get(TYPE)? {
        single @ (Value::String(_) | Value::Uri(_)) => single.as_str().map(|t| vec![t]),
        Value::Array(items) => Some(items.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn type_value(types: &[&str]) -> Value {
    match types {
        [single] => Value::from_text(*single),
        _ => Value::Array(types.iter().map(|t| Value::from_text(*t)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(json: serde_json::Value) -> DidDocument {
        DidDocument::from_json(&json.to_string()).expect("should parse")
    }

    #[test]
    fn build_omits_null_lists() {
        let doc = DidDocument::build(Some("did:example:123"), None, None);
        let keys: Vec<&str> = doc.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id"]);
        assert_eq!(doc.public_keys(), None);
        assert_eq!(doc.services(), None);
    }

    #[test]
    fn build_keeps_empty_lists() {
        let doc = DidDocument::build(Some("did:example:123"), Some(&[]), Some(&[]));
        assert_eq!(doc.fields()[PUBLIC_KEY], Value::Array(vec![]));
        assert_eq!(doc.fields()[SERVICE], Value::Array(vec![]));
        assert_eq!(doc.public_keys(), Some(vec![]));
        assert_eq!(doc.services(), Some(vec![]));
    }

    #[test]
    fn build_writes_null_id() {
        let doc = DidDocument::build(None, None, None);
        assert_eq!(doc.fields().get(ID), Some(&Value::Null));
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn build_preserves_key_order() {
        let keys = [
            PublicKey::build(Some("did:example:123#key-1"), None, None, Some("01")),
            PublicKey::build(Some("did:example:123#key-2"), None, None, Some("02")),
        ];
        let doc = DidDocument::build(Some("did:example:123"), Some(&keys), None);

        let read = doc.public_keys().expect("should have keys");
        let ids: Vec<Option<&str>> = read.iter().map(PublicKey::id).collect();
        assert_eq!(ids, vec![Some("did:example:123#key-1"), Some("did:example:123#key-2")]);
    }

    #[test]
    fn id_requires_uri() {
        let doc = document(json!({"id": "did:example:123"}));
        assert_eq!(doc.id().map(Uri::as_str), Some("did:example:123"));

        let doc = document(json!({"id": "not a uri"}));
        assert_eq!(doc.id(), None);

        let doc = document(json!({"id": 7}));
        assert_eq!(doc.id(), None);

        let doc = document(json!({}));
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn service_not_an_array() {
        let doc = document(json!({"service": "https://example.com/service"}));
        assert_eq!(doc.services(), None);
    }

    #[test]
    fn skip_malformed_public_key() {
        let doc = document(json!({
            "publicKey": [
                {"id": "did:example:123#key-1", "type": "Ed25519VerificationKey2018"},
                "did:example:123#key-2"
            ]
        }));

        let keys = doc.public_keys().expect("should have keys");
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id(), Some("did:example:123#key-1"));
    }

    #[test]
    fn non_object_root() {
        let doc = DidDocument::from_json(r#"["did:example:123"]"#).expect("should parse");
        assert!(doc.fields().is_empty());
        assert_eq!(doc.id(), None);
        assert_eq!(doc.public_keys(), None);
    }

    #[test]
    fn malformed_json() {
        let err = DidDocument::from_json(r#"{"id": "did:example:123""#).expect_err("should fail");
        assert!(err.is(Err::Decoding));
    }

    #[test]
    fn set_field_overwrites() {
        let mut doc = DidDocument::build(Some("did:example:123"), None, None);
        doc.set_field(ID, "did:example:456");
        doc.set_field(SERVICE, Value::Bool(false));

        assert_eq!(doc.id().map(Uri::as_str), Some("did:example:456"));
        assert_eq!(doc.services(), None);
        let keys: Vec<&str> = doc.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "service"]);
    }

    #[test]
    fn decode_encodings() {
        let json = r#"{"id": "did:example:123"}"#;

        let mut utf8 = vec![0xef, 0xbb, 0xbf];
        utf8.extend_from_slice(json.as_bytes());
        let doc = DidDocument::from_slice(&utf8, Encoding::Utf8).expect("should parse");
        assert_eq!(doc.id().map(Uri::as_str), Some("did:example:123"));

        let le: Vec<u8> = json.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let doc = DidDocument::from_slice(&le, Encoding::Utf16Le).expect("should parse");
        assert_eq!(doc.id().map(Uri::as_str), Some("did:example:123"));

        let be: Vec<u8> = json.encode_utf16().flat_map(u16::to_be_bytes).collect();
        let doc = DidDocument::from_reader(be.as_slice(), Encoding::Utf16Be).expect("should parse");
        assert_eq!(doc.id().map(Uri::as_str), Some("did:example:123"));
    }

    #[test]
    fn reject_invalid_bytes() {
        let err = DidDocument::from_slice(&[0x7b, 0xff, 0x7d], Encoding::Utf8).expect_err("should fail");
        assert!(err.is(Err::Decoding));

        let err = DidDocument::from_slice(&[0x7b, 0x00, 0x7d], Encoding::Utf16Le).expect_err("should fail");
        assert!(err.is(Err::Decoding));
    }

    #[test]
    fn serde_transparent() {
        let doc = DidDocument::build(Some("did:example:123"), None, Some(&[]));
        let json = serde_json::to_string(&doc).expect("should serialize");
        assert_eq!(json, r#"{"id":"did:example:123","service":[]}"#);

        let back: DidDocument = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, doc);
    }
}
