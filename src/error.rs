use crate::bank::error::BankError;
use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Represents an error that can occur when decoding a soundbank.
///
/// Decoding errors are never recoverable: a soundbank that fails to decode yields no objects, and
/// a set of soundbanks containing one yields no object graph.
#[derive(Debug)]
pub struct DecodeError {
    blob: Option<usize>,
    inner: Box<BankError>,
}

impl DecodeError {
    /// Returns the index of the offending soundbank, if it was decoded as part of a set.
    #[must_use]
    pub fn blob(&self) -> Option<usize> {
        self.blob
    }

    /// Returns the byte position in the soundbank where decoding failed.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    pub(crate) fn in_blob(mut self, index: usize) -> Self {
        self.blob = Some(index);
        self
    }
}

impl From<BankError> for DecodeError {
    fn from(value: BankError) -> Self {
        Self {
            blob: None,
            inner: Box::new(value),
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.inner.fmt(f)?;

        match self.blob {
            Some(index) => f.write_str(&format!(" - soundbank at index {index}")),
            None => Ok(()),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}
