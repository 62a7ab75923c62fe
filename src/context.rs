//! # Linked-Data Context
//!
//! A parsed JSON-LD context: the term definitions the compaction transform uses
//! to rewrite IRIs into the short terms of the DID vocabulary.
//!
//! Only what the bundled DID context needs is supported: keyword aliases,
//! simple and expanded term definitions, prefixes and compact IRIs. Contexts
//! using `@vocab`, `@base`, scoped contexts or any expanded definition key
//! other than `@id`, `@type` and `@container` are rejected when parsed.

use indexmap::IndexMap;

use crate::error::Err;
use crate::value::{Map, Value};
use crate::{tracerr, Result};

/// The published IRI of the bundled DID context.
pub const DID_CONTEXT: &str = "https://w3id.org/did/v0.11";

/// Keywords a term may alias or a document may use as a key.
const KEYWORDS: [&str; 4] = ["@context", "@id", "@type", "@value"];

/// Keys an expanded term definition may use.
const DEFINITION_KEYS: [&str; 3] = ["@id", "@type", "@container"];

/// Definition of a single term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermDefinition {
    /// The expanded IRI the term stands for, or the keyword it aliases.
    pub iri: String,

    /// Type coercion applied to the term's values (`@id`, `@vocab`, `@json`
    /// or an expanded datatype IRI).
    pub type_mapping: Option<String>,

    /// Container mapping for the term's values.
    pub container: Option<Container>,
}

impl TermDefinition {
    /// Returns `true` if the term aliases a JSON-LD keyword.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        self.iri.starts_with('@')
    }

    /// Returns `true` if values are always emitted as an array.
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self.container, Some(Container::Set | Container::List))
    }
}

/// Container mappings supported by term definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// Unordered set, always emitted as an array.
    Set,

    /// Ordered list, always emitted as an array.
    List,

    /// Named graph.
    Graph,
}

/// A parsed linked-data context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    iri: String,
    terms: IndexMap<String, TermDefinition>,
}

impl Context {
    /// Parse a context document (an object with a single `@context` entry)
    /// published at `iri`.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Initialization`] if the document is not a context
    /// document or uses features outside the supported subset.
    pub fn parse(iri: &str, document: &Map) -> Result<Self> {
        let Some(Value::Object(local)) = document.get("@context") else {
            tracerr!(Err::Initialization, "context document has no `@context` object");
        };

        // simple string definitions first so prefixes resolve in any order
        let mut prefixes = IndexMap::new();
        for (term, def) in local {
            if let Some(s) = def.as_str() {
                if !term.starts_with('@') && !s.starts_with('@') {
                    prefixes.insert(term.as_str(), s);
                }
            }
        }
        let expand = |s: &str| expand_with(&prefixes, s);

        let mut terms = IndexMap::new();
        for (term, def) in local {
            if term.starts_with('@') {
                match term.as_str() {
                    "@version" | "@protected" => continue,
                    _ => tracerr!(Err::Initialization, "unsupported context keyword: {term}"),
                }
            }

            let definition = match def {
                Value::String(_) | Value::Uri(_) => {
                    let s = def.as_str().unwrap_or_default();
                    if s.starts_with('@') && !KEYWORDS.contains(&s) {
                        tracerr!(Err::Initialization, "term {term} aliases unknown keyword {s}");
                    }
                    TermDefinition {
                        iri: expand(s),
                        type_mapping: None,
                        container: None,
                    }
                }
                Value::Object(expanded) => {
                    let unsupported = expanded.keys().find(|k| !DEFINITION_KEYS.contains(&k.as_str()));
                    if let Some(key) = unsupported {
                        tracerr!(Err::Initialization, "term {term} uses unsupported {key}");
                    }
                    let Some(id) = expanded.get("@id").and_then(Value::as_str) else {
                        tracerr!(Err::Initialization, "term {term} has no `@id`");
                    };
                    let type_mapping = match expanded.get("@type") {
                        None => None,
                        Some(t) => match t.as_str() {
                            Some(t @ ("@id" | "@vocab" | "@json")) => Some(t.to_string()),
                            Some(t) => Some(expand(t)),
                            None => tracerr!(Err::Initialization, "term {term} has invalid `@type`"),
                        },
                    };
                    let container = match expanded.get("@container").map(container_name) {
                        None => None,
                        Some(None) => {
                            tracerr!(Err::Initialization, "term {term} has invalid `@container`")
                        }
                        Some(Some(c)) => match c {
                            "@set" => Some(Container::Set),
                            "@list" => Some(Container::List),
                            "@graph" => Some(Container::Graph),
                            _ => tracerr!(Err::Initialization, "unsupported container {c}"),
                        },
                    };
                    TermDefinition {
                        iri: expand(id),
                        type_mapping,
                        container,
                    }
                }
                _ => tracerr!(Err::Initialization, "invalid definition for term {term}"),
            };
            terms.insert(term.clone(), definition);
        }

        Ok(Self {
            iri: iri.to_string(),
            terms,
        })
    }

    /// The IRI the context is published at.
    #[must_use]
    pub fn iri(&self) -> &str {
        &self.iri
    }

    /// Look up a term definition.
    #[must_use]
    pub fn term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    /// The term aliasing `keyword`, if any.
    #[must_use]
    pub fn alias(&self, keyword: &str) -> Option<&str> {
        self.terms.iter().find(|(_, def)| def.iri == keyword).map(|(term, _)| term.as_str())
    }

    /// Expand a term or compact IRI to an absolute IRI. Values that are
    /// neither are returned unchanged.
    #[must_use]
    pub fn expand_iri(&self, value: &str) -> String {
        if let Some(def) = self.terms.get(value) {
            return def.iri.clone();
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if !suffix.starts_with("//") {
                if let Some(def) = self.terms.get(prefix) {
                    if def.type_mapping.is_none() && !def.is_keyword() {
                        return format!("{}{suffix}", def.iri);
                    }
                }
            }
        }
        value.to_string()
    }

    /// Compact an absolute IRI to the matching term, or failing that to the
    /// shortest compact IRI using a prefix. IRIs with no match are returned
    /// unchanged.
    #[must_use]
    pub fn compact_iri(&self, iri: &str) -> String {
        if let Some((term, _)) =
            self.terms.iter().find(|(_, def)| !def.is_keyword() && def.iri == iri)
        {
            return term.clone();
        }

        self.terms
            .iter()
            .filter(|(_, def)| def.type_mapping.is_none() && is_prefix_iri(&def.iri))
            .filter_map(|(term, def)| {
                iri.strip_prefix(def.iri.as_str())
                    .filter(|suffix| !suffix.is_empty())
                    .map(|suffix| format!("{term}:{suffix}"))
            })
            .min_by_key(String::len)
            .unwrap_or_else(|| iri.to_string())
    }
}

// A container is a keyword, or an array holding exactly one keyword.
fn container_name(value: &Value) -> Option<&str> {
    match value {
        Value::Array(items) => match items.as_slice() {
            [only] => only.as_str(),
            _ => None,
        },
        _ => value.as_str(),
    }
}

fn expand_with(prefixes: &IndexMap<&str, &str>, value: &str) -> String {
    if let Some((prefix, suffix)) = value.split_once(':') {
        if !suffix.starts_with("//") {
            if let Some(base) = prefixes.get(prefix) {
                return format!("{base}{suffix}");
            }
        }
    }
    value.to_string()
}

fn is_prefix_iri(iri: &str) -> bool {
    iri.ends_with(['/', '#', ':', '?', '[', ']', '@'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(json: serde_json::Value) -> Result<Context> {
        let Value::Object(doc) = Value::from(json) else {
            panic!("expected object");
        };
        Context::parse(DID_CONTEXT, &doc)
    }

    fn did_context() -> Context {
        let doc: Map =
            serde_json::from_str(include_str!("../resources/did-context.jsonld")).expect("should parse");
        Context::parse(DID_CONTEXT, &doc).expect("should parse context")
    }

    #[test]
    fn parse_bundled() {
        let ctx = did_context();
        assert_eq!(ctx.iri(), DID_CONTEXT);
        assert_eq!(ctx.alias("@id"), Some("id"));
        assert_eq!(ctx.alias("@type"), Some("type"));

        let pk = ctx.term("publicKey").expect("should have publicKey");
        assert_eq!(pk.iri, "https://w3id.org/security#publicKey");
        assert_eq!(pk.type_mapping.as_deref(), Some("@id"));
        assert!(pk.is_set());

        let created = ctx.term("created").expect("should have created");
        assert_eq!(created.type_mapping.as_deref(), Some("http://www.w3.org/2001/XMLSchema#dateTime"));
    }

    #[test]
    fn expand_and_compact() {
        let ctx = did_context();
        assert_eq!(ctx.expand_iri("sec:publicKey"), "https://w3id.org/security#publicKey");
        assert_eq!(ctx.expand_iri("service"), "https://w3id.org/did#service");
        assert_eq!(ctx.expand_iri("https://example.com/x"), "https://example.com/x");

        assert_eq!(ctx.compact_iri("https://w3id.org/security#publicKey"), "publicKey");
        assert_eq!(ctx.compact_iri("https://w3id.org/security#somethingElse"), "sec:somethingElse");
        assert_eq!(ctx.compact_iri("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn reject_vocab() {
        let err = context(serde_json::json!({"@context": {"@vocab": "https://example.com/"}}))
            .expect_err("should fail");
        assert!(err.is(Err::Initialization));
    }

    #[test]
    fn reject_unsupported_definition_keys() {
        for key in ["@context", "@reverse", "@language", "@prefix", "@nest"] {
            let err = context(serde_json::json!({"@context": {
                "foo": {"@id": "https://example.com/foo", key: "x"}
            }}))
            .expect_err("should fail");
            assert!(err.is(Err::Initialization), "{key} should be rejected");
        }
    }

    #[test]
    fn container_array_form() {
        let ctx = context(serde_json::json!({"@context": {
            "foo": {"@id": "https://example.com/foo", "@container": ["@set"]}
        }}))
        .expect("should parse");
        let foo = ctx.term("foo").expect("should have foo");
        assert_eq!(foo.container, Some(Container::Set));
        assert!(foo.is_set());

        let err = context(serde_json::json!({"@context": {
            "foo": {"@id": "https://example.com/foo", "@container": ["@set", "@index"]}
        }}))
        .expect_err("should fail");
        assert!(err.is(Err::Initialization));
    }

    #[test]
    fn reject_missing_context() {
        let err = context(serde_json::json!({"id": "@id"})).expect_err("should fail");
        assert!(err.is(Err::Initialization));
    }
}
