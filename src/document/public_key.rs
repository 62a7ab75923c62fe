//! Public keys published by a DID document.

use base64ct::{Base64, Encoding};

use super::{type_value, types, ID, PUBLIC_KEY_BASE64, PUBLIC_KEY_HEX, TYPE};
use crate::error::Err;
use crate::value::{Map, Value};
use crate::{tracerr, Result};

/// A public key entry of a DID document, held in its raw linked-data form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublicKey {
    object: Map,
}

impl PublicKey {
    /// Wrap a raw public key object.
    #[must_use]
    pub const fn from_object(object: Map) -> Self {
        Self { object }
    }

    /// Create a public key from its parts. Parts that are `None` are left
    /// out of the object.
    #[must_use]
    pub fn build(
        id: Option<&str>, key_types: Option<&[&str]>, public_key_base64: Option<&str>,
        public_key_hex: Option<&str>,
    ) -> Self {
        let mut object = Map::new();
        if let Some(id) = id {
            object.insert(ID.to_string(), Value::from_text(id));
        }
        if let Some(key_types) = key_types {
            object.insert(TYPE.to_string(), type_value(key_types));
        }
        if let Some(b64) = public_key_base64 {
            object.insert(PUBLIC_KEY_BASE64.to_string(), Value::String(b64.to_string()));
        }
        if let Some(hex) = public_key_hex {
            object.insert(PUBLIC_KEY_HEX.to_string(), Value::String(hex.to_string()));
        }
        Self { object }
    }

    /// The raw object for inclusion in a DID document.
    #[must_use]
    pub fn to_object(&self) -> Map {
        self.object.clone()
    }

    /// Consume the key, returning its raw object.
    #[must_use]
    pub fn into_object(self) -> Map {
        self.object
    }

    /// The key's identifier, usually a DID URL with a fragment.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.object.get(ID).and_then(Value::as_str)
    }

    /// The key's types. A single type is returned as a one-element list.
    #[must_use]
    pub fn types(&self) -> Option<Vec<&str>> {
        types(&self.object)
    }

    /// Base64-encoded key material.
    #[must_use]
    pub fn public_key_base64(&self) -> Option<&str> {
        self.object.get(PUBLIC_KEY_BASE64).and_then(Value::as_str)
    }

    /// Hex-encoded key material.
    #[must_use]
    pub fn public_key_hex(&self) -> Option<&str> {
        self.object.get(PUBLIC_KEY_HEX).and_then(Value::as_str)
    }

    /// Decode the key material, preferring the base64 encoding when both are
    /// present. `None` when the key carries neither.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Decoding`] if the key material is not valid for its
    /// encoding.
    pub fn key_bytes(&self) -> Result<Option<Vec<u8>>> {
        if let Some(b64) = self.public_key_base64() {
            return match Base64::decode_vec(b64) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) => tracerr!(Err::Decoding, "invalid publicKeyBase64: {e}"),
            };
        }
        if let Some(encoded) = self.public_key_hex() {
            return match hex::decode(encoded) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) => tracerr!(Err::Decoding, "invalid publicKeyHex: {e}"),
            };
        }
        Ok(None)
    }
}

impl From<Map> for PublicKey {
    fn from(object: Map) -> Self {
        Self::from_object(object)
    }
}
