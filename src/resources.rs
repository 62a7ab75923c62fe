//! # Resources
//!
//! The linked-data context and the skeleton document every serialized DID
//! document is built on. Both are bundled with the crate, parsed once by
//! [`init`] and shared read-only afterwards.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::context::Context;
use crate::error::Err;
use crate::value::{Map, Value};
use crate::{tracerr, Result};

const CONTEXT_DOCUMENT: &str = include_str!("../resources/did-context.jsonld");
const SKELETON_DOCUMENT: &str = include_str!("../resources/did-skeleton.jsonld");

static RESOURCES: OnceLock<Arc<Resources>> = OnceLock::new();

/// Parsed context and skeleton documents.
#[derive(Clone, Debug)]
pub struct Resources {
    context: Context,
    skeleton: Map,
}

impl Resources {
    /// Parse the context and skeleton documents bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Initialization`] if either document fails to parse.
    pub fn bundled() -> Result<Self> {
        Self::from_json(CONTEXT_DOCUMENT, SKELETON_DOCUMENT)
    }

    /// Parse a context document and the skeleton it is used with. The
    /// skeleton's `@context` entry names the IRI the context is published at.
    ///
    /// # Errors
    ///
    /// Returns [`Err::Initialization`] if either document is not a JSON
    /// object, the skeleton does not reference its context by IRI, or the
    /// context uses unsupported features.
    pub fn from_json(context: &str, skeleton: &str) -> Result<Self> {
        let skeleton: Map = match serde_json::from_str(skeleton) {
            Ok(skeleton) => skeleton,
            Err(e) => tracerr!(Err::Initialization, "invalid skeleton document: {e}"),
        };
        let context_doc: Map = match serde_json::from_str(context) {
            Ok(context) => context,
            Err(e) => tracerr!(Err::Initialization, "invalid context document: {e}"),
        };

        let Some(iri) = skeleton.get("@context").and_then(Value::as_uri) else {
            tracerr!(Err::Initialization, "skeleton must reference its context by IRI");
        };
        let context = Context::parse(iri.as_str(), &context_doc)?;

        debug!("loaded context {}", context.iri());
        Ok(Self { context, skeleton })
    }

    /// The linked-data context used for compaction.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// The skeleton document merged beneath every serialized document.
    #[must_use]
    pub const fn skeleton(&self) -> &Map {
        &self.skeleton
    }
}

/// Load the bundled resources for process-wide use. Call once at startup;
/// later calls return the already loaded resources.
///
/// # Errors
///
/// Returns [`Err::Initialization`] if the bundled documents fail to parse.
/// The failure is not cached, but since the documents are fixed a retry will
/// fail the same way.
pub fn init() -> Result<Arc<Resources>> {
    if let Some(resources) = RESOURCES.get() {
        return Ok(Arc::clone(resources));
    }
    let loaded = Arc::new(Resources::bundled()?);
    Ok(Arc::clone(RESOURCES.get_or_init(|| loaded)))
}

/// The process-wide resources installed by [`init`].
///
/// # Errors
///
/// Returns [`Err::Initialization`] if [`init`] has not completed.
pub fn get() -> Result<Arc<Resources>> {
    match RESOURCES.get() {
        Some(resources) => Ok(Arc::clone(resources)),
        None => tracerr!(Err::Initialization, "resources have not been initialized"),
    }
}
