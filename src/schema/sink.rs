//! Ordered log of validation failures for one validation pass

use std::ops::Index;
use std::slice;

use super::errors::ValidationError;

/// Append-only within a pass; cleared at the start of the next one.
///
/// Entry 0 is always the first violation detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSink {
    entries: Vec<ValidationError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, error: ValidationError) {
        self.entries.push(error);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, ValidationError> {
        self.entries.iter()
    }

    /// Returns the message text of every entry, in order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ValidationError::message).collect()
    }
}

impl Index<usize> for ErrorSink {
    type Output = ValidationError;

    fn index(&self, index: usize) -> &ValidationError {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a ErrorSink {
    type Item = &'a ValidationError;
    type IntoIter = slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<ValidationError> for ErrorSink {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationErrorKind;

    #[test]
    fn test_append_preserves_order() {
        let mut sink = ErrorSink::new();
        sink.append(ValidationError::new(ValidationErrorKind::TypeMismatch, "/a"));
        sink.append(ValidationError::new(ValidationErrorKind::TypeMismatch, "/a"));
        sink.append(ValidationError::new(ValidationErrorKind::UnknownType, ""));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink[0].kind(), ValidationErrorKind::TypeMismatch);
        assert_eq!(sink[2].kind(), ValidationErrorKind::UnknownType);
        assert_eq!(
            sink.messages(),
            vec!["Type is incorrect", "Type is incorrect", "Unknown type"]
        );
    }

    #[test]
    fn test_clear() {
        let mut sink = ErrorSink::new();
        sink.append(ValidationError::new(ValidationErrorKind::TooFewItems, ""));
        sink.clear();
        assert!(sink.is_empty());
        assert!(sink.first().is_none());
    }
}
