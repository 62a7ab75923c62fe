//! # DID Document Errors
//!
//! Error types for reading, building and serializing DID documents. Reads are
//! lenient: a document with an unexpected shape is not an error, accessors
//! simply report absence. Writes are strict and surface failures here.

use std::fmt::Display;

use thiserror::Error;

/// Simplify creation of errors with tracing.
///
/// # Example
/// ```
/// use did_document::error::Err;
/// use did_document::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::Compaction, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::Compaction)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type for DID documents.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to a JSON object with a machine-readable code and a
    /// human-readable description.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if `err` is the code held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }
}

/// Typed error codes.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// Input could not be decoded to text or is not well-formed JSON.
    #[error("decoding_error")]
    Decoding,

    /// The compaction transform rejected the merged document.
    #[error("compaction_error")]
    Compaction,

    /// The context or skeleton resources failed to load, or were never
    /// initialized.
    #[error("initialization_error")]
    Initialization,

    /// The compacted document could not be rendered as text.
    #[error("encoding_error")]
    Encoding,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::Result;

    #[test]
    fn base_err() {
        let err: Error = Err::Compaction.into();

        assert_eq!(
            err.to_json(),
            json!({"error":"compaction_error","error_description":"compaction_error"})
        );
        assert!(err.is(Err::Compaction));
        assert!(!err.is(Err::Decoding));
    }

    #[test]
    fn context_err() {
        let res: Result<()> = Err(Err::Decoding).context("input is not valid JSON");
        let err = res.expect_err("expected error");

        assert_eq!(
            err.to_json(),
            json!({"error":"decoding_error","error_description":"input is not valid JSON"})
        );
        assert!(err.is(Err::Decoding));
    }

    #[test]
    fn test_macro() {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        let Err(e) = tracing::subscriber::with_default(subscriber, run_macro) else {
            panic!("expected error");
        };

        assert_eq!(e.to_string(), "test me");
        assert!(e.is(Err::Encoding));
    }

    fn run_macro() -> Result<()> {
        tracerr!(Err::Encoding, "test {}", "me")
    }
}
