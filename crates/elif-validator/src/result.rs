//! Outcome of a single `validate` call

use crate::error::{ValidationError, ValidationErrors};
use crate::message::{DefaultMessageResolver, Locale, MessageResolver};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Errors collected by one validation pass, in chain registration order
#[derive(Clone)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    resolver: Arc<dyn MessageResolver>,
}

impl ValidationResult {
    /// Empty result using [`DefaultMessageResolver`]
    pub fn new() -> Self {
        Self::with_message_resolver(Arc::new(DefaultMessageResolver))
    }

    /// Create an empty result that renders messages through `resolver`
    pub fn with_message_resolver(resolver: Arc<dyn MessageResolver>) -> Self {
        Self {
            errors: Vec::new(),
            resolver,
        }
    }

    /// Replace the resolver used by `error_messages`
    pub fn set_message_resolver(&mut self, resolver: Arc<dyn MessageResolver>) {
        self.resolver = resolver;
    }

    /// Record one failed chain
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Errors in the order their chains were registered
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Every error reported against `field`, in order
    pub fn errors_for<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |error| error.field() == field)
    }

    /// True when no chain failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.is_valid()
    }

    /// Number of failed chains
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resolve one error with this result's resolver
    pub fn message_for(&self, error: &ValidationError, locale: Option<&Locale>) -> String {
        self.resolver.resolve(error, locale)
    }

    /// Field to message map; when a field failed more than once the last
    /// error wins. Use [`errors`](Self::errors) to see all of them.
    pub fn error_messages(&self, locale: Option<&Locale>) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|error| (error.field().to_string(), self.resolver.resolve(error, locale)))
            .collect()
    }

    /// `Ok` when valid, otherwise the errors grouped by field
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationResult")
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl From<ValidationResult> for ValidationErrors {
    fn from(result: ValidationResult) -> Self {
        result.errors.into_iter().collect()
    }
}

impl IntoIterator for ValidationResult {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CatalogResolver, MessageCatalog};
    use crate::value::PropertyPath;

    fn error(field: &str, code: &str, message: &str) -> ValidationError {
        ValidationError::new(PropertyPath::parse(field).unwrap(), code, message)
    }

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid());
        assert!(!result.has_errors());
        assert!(result.error_messages(None).is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_later_error_wins_in_message_map() {
        let mut result = ValidationResult::new();
        result.add_error(error("name", "first", "First message"));
        result.add_error(error("name", "second", "Second message"));
        result.add_error(error("age", "third", "Third message"));

        let messages = result.error_messages(None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages["name"], "Second message");
        assert_eq!(result.errors_for("name").count(), 2);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_resolver_can_be_swapped() {
        let mut result = ValidationResult::new();
        result.add_error(error("name", "validator.required", "Required"));

        let catalog =
            MessageCatalog::new().with_message("el", "validator.required", "Υποχρεωτικό");
        result.set_message_resolver(Arc::new(CatalogResolver::from(catalog)));

        let greek = Locale::new("el");
        assert_eq!(result.error_messages(Some(&greek))["name"], "Υποχρεωτικό");
        assert_eq!(result.error_messages(None)["name"], "Required");
    }

    #[test]
    fn test_into_result_groups_by_field() {
        let mut result = ValidationResult::new();
        result.add_error(error("address.city", "validator.required", "Required"));
        result.add_error(error("address.city", "validator.string.max.length", "Too long"));

        let errors = result.into_result().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.total_errors(), 2);
        assert!(errors.has_errors_for("address.city"));
    }
}
