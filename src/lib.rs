//! # DID Document
//!
//! A structured view of a Decentralized Identifier (DID) Document over its raw
//! linked-data representation.
//!
//! Documents are read from JSON into an ordered map of terms to values and
//! exposed through typed accessors for the subject identifier, public keys and
//! services. Serialization lays the document over a fixed skeleton and
//! compacts the result against the bundled DID context.
//!
//! The context and skeleton are loaded once, at startup, by
//! [`resources::init`]:
//!
//! ```
//! use did_document::{resources, DidDocument};
//!
//! resources::init().expect("should load resources");
//!
//! let doc = DidDocument::build(Some("did:example:123"), Some(&[]), Some(&[]));
//! let json = doc.to_json().expect("should serialize");
//! assert!(json.contains(r#""id": "did:example:123""#));
//! ```
//!
//! See [Decentralized Identifiers (DIDs)](https://www.w3.org/TR/did-core/) for
//! more information.

pub mod compact;
pub mod context;
mod document;
pub mod error;
pub mod resources;
pub mod value;

pub use self::compact::{CompactOptions, Compactor, TermCompactor};
pub use self::context::{Context, DID_CONTEXT};
pub use self::document::*;
pub use self::error::Error;
pub use self::resources::Resources;
pub use self::value::{Map, Uri, Value};

/// Result type for DID document operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
