//! # Compaction
//!
//! Rewrites a linked-data document into its shortest form under a context.
//! [`Compactor`] is the seam the document serializer calls through;
//! [`TermCompactor`] implements the narrow compaction needed for the bundled
//! DID context and skeleton.

use tracing::debug;

use crate::context::{Context, TermDefinition};
use crate::error::Err;
use crate::value::{Map, Value};
use crate::{tracerr, Result};

/// Compacts a merged document against a context.
pub trait Compactor {
    /// Compact `document` against `context`. The input is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Compaction`] if the document cannot be compacted.
    fn compact(&self, document: &Map, context: &Context) -> Result<Map>;
}

/// Options controlling compaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactOptions {
    /// Collapse single-element arrays into their element, except for terms
    /// with a `@set` or `@list` container.
    pub compact_arrays: bool,
}

impl Default for CompactOptions {
    fn default() -> Self {
        Self { compact_arrays: true }
    }
}

/// Term-based compaction over a single, fully known context.
#[derive(Clone, Copy, Debug, Default)]
pub struct TermCompactor {
    options: CompactOptions,
}

impl TermCompactor {
    /// Create a compactor with the given options.
    #[must_use]
    pub const fn new(options: CompactOptions) -> Self {
        Self { options }
    }
}

impl Compactor for TermCompactor {
    fn compact(&self, document: &Map, context: &Context) -> Result<Map> {
        let mut compacted = Map::new();
        compacted.insert("@context".to_string(), Value::from_text(context.iri()));

        let body = Pass { context, options: self.options }.object(document)?;
        for (key, value) in body {
            compacted.insert(key, value);
        }
        Ok(compacted)
    }
}

// How a document key is treated once resolved against the context.
enum Key<'a> {
    Id,
    Type,
    Term(Option<&'a TermDefinition>),
}

struct Pass<'a> {
    context: &'a Context,
    options: CompactOptions,
}

impl<'a> Pass<'a> {
    fn object(&self, map: &Map) -> Result<Map> {
        let mut out = Map::new();

        for (key, value) in map {
            if key == "@context" {
                self.check_context(value)?;
                continue;
            }
            let Some((term, kind)) = self.resolve(key)? else {
                debug!("dropping undefined term {key}");
                continue;
            };
            let Some(compacted) = self.entry(&kind, value)? else {
                continue;
            };
            if out.contains_key(&term) {
                tracerr!(Err::Compaction, "colliding keys: {key} compacts to existing term {term}");
            }
            out.insert(term, compacted);
        }

        Ok(out)
    }

    // Resolve a document key to its compacted term. `None` for undefined terms.
    fn resolve(&self, key: &str) -> Result<Option<(String, Key<'a>)>> {
        if key.starts_with('@') {
            let kind = match key {
                "@id" => Key::Id,
                "@type" => Key::Type,
                _ => tracerr!(Err::Compaction, "invalid keyword: {key}"),
            };
            let term = self.context.alias(key).unwrap_or(key);
            return Ok(Some((term.to_string(), kind)));
        }

        if let Some(def) = self.context.term(key) {
            let kind = match def.iri.as_str() {
                "@id" => Key::Id,
                "@type" => Key::Type,
                iri if def.is_keyword() => {
                    tracerr!(Err::Compaction, "term {key} aliases unsupported keyword {iri}")
                }
                _ => Key::Term(Some(def)),
            };
            return Ok(Some((key.to_string(), kind)));
        }

        if key.contains(':') {
            let term = self.context.compact_iri(&self.context.expand_iri(key));
            let def = self.context.term(&term);
            return Ok(Some((term, Key::Term(def))));
        }

        Ok(None)
    }

    fn entry(&self, kind: &Key<'a>, value: &Value) -> Result<Option<Value>> {
        match kind {
            Key::Id => match value {
                Value::Null => Ok(None),
                Value::String(_) | Value::Uri(_) => Ok(Some(value.clone())),
                _ => tracerr!(Err::Compaction, "invalid @id value: {value:?}"),
            },
            Key::Type => self.types(value).map(Some),
            Key::Term(def) => self.values(*def, value),
        }
    }

    fn types(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(_) | Value::Uri(_) => Ok(self.vocab(value)),
            Value::Array(items) => {
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    if item.as_str().is_none() {
                        tracerr!(Err::Compaction, "invalid @type value: {item:?}");
                    }
                    types.push(self.vocab(item));
                }
                Ok(self.array(None, types))
            }
            _ => tracerr!(Err::Compaction, "invalid @type value: {value:?}"),
        }
    }

    fn values(&self, def: Option<&TermDefinition>, value: &Value) -> Result<Option<Value>> {
        if def.and_then(|d| d.type_mapping.as_deref()) == Some("@json") {
            return Ok(Some(value.clone()));
        }

        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let mut compacted = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(v) = self.element(def, item)? {
                        compacted.push(v);
                    }
                }
                Ok(Some(self.array(def, compacted)))
            }
            _ => {
                let Some(element) = self.element(def, value)? else {
                    return Ok(None);
                };
                if def.is_some_and(TermDefinition::is_set) {
                    return Ok(Some(Value::Array(vec![element])));
                }
                Ok(Some(element))
            }
        }
    }

    fn element(&self, def: Option<&TermDefinition>, value: &Value) -> Result<Option<Value>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) if map.contains_key("@value") => {
                if map.len() > 1 {
                    tracerr!(Err::Compaction, "unsupported value object: {map:?}");
                }
                Ok(Some(map["@value"].clone()))
            }
            Value::Object(map) => Ok(Some(Value::Object(self.object(map)?))),
            Value::String(_) | Value::Uri(_)
                if def.and_then(|d| d.type_mapping.as_deref()) == Some("@vocab") =>
            {
                Ok(Some(self.vocab(value)))
            }
            _ => Ok(Some(value.clone())),
        }
    }

    fn array(&self, def: Option<&TermDefinition>, mut items: Vec<Value>) -> Value {
        if self.options.compact_arrays && items.len() == 1 && !def.is_some_and(TermDefinition::is_set)
        {
            return items.remove(0);
        }
        Value::Array(items)
    }

    // Compact a vocabulary-relative IRI such as a type name.
    fn vocab(&self, value: &Value) -> Value {
        let text = value.as_str().unwrap_or_default();
        Value::from_text(self.context.compact_iri(&self.context.expand_iri(text)))
    }

    fn check_context(&self, value: &Value) -> Result<()> {
        let iri = self.context.iri();
        let supported = match value {
            Value::Null => true,
            Value::String(_) | Value::Uri(_) => value.as_str() == Some(iri),
            Value::Array(items) => matches!(items.as_slice(), [only] if only.as_str() == Some(iri)),
            _ => false,
        };
        if !supported {
            tracerr!(Err::Compaction, "unsupported @context: {value:?}");
        }
        Ok(())
    }
}
