//! Leaf predicates and the immutable rules that wrap them

use crate::error::{Result, ValidationError, ValidatorError};
use crate::value::PropertyPath;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// A single boolean test over a value.
///
/// Closures qualify through the blanket impl; format checkers implement it
/// directly.
pub trait Predicate<T: ?Sized>: Send + Sync {
    fn test(&self, value: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn test(&self, value: &T) -> bool {
        self(value)
    }
}

/// A predicate plus the error reported when it fails
pub struct Rule<T: ?Sized> {
    code: String,
    message: String,
    args: Vec<JsonValue>,
    predicate: Arc<dyn Predicate<T>>,
}

impl<T: ?Sized + 'static> Rule<T> {
    /// Create a new rule from a code, a default message and a predicate
    pub fn new<P>(code: impl Into<String>, message: impl Into<String>, predicate: P) -> Self
    where
        P: Predicate<T> + 'static,
    {
        Self {
            code: code.into(),
            message: message.into(),
            args: Vec::new(),
            predicate: Arc::new(predicate),
        }
    }

    /// Start a rule step by step, see [`RuleBuilder`]
    pub fn builder() -> RuleBuilder<T> {
        RuleBuilder::new()
    }
}

impl<T: ?Sized> Rule<T> {
    /// Positional arguments for message templates
    pub fn with_args(mut self, args: Vec<JsonValue>) -> Self {
        self.args = args;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn args(&self) -> &[JsonValue] {
        &self.args
    }

    /// Run the predicate
    pub fn test(&self, value: &T) -> bool {
        self.predicate.test(value)
    }

    /// The error this rule reports against `field`
    pub fn to_error(&self, field: &PropertyPath) -> ValidationError {
        ValidationError::new(field.clone(), self.code.clone(), self.message.clone())
            .with_args(self.args.clone())
    }

    pub(crate) fn set_code(&mut self, code: String) {
        self.code = code;
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = message;
    }
}

impl<T: ?Sized> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            message: self.message.clone(),
            args: self.args.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("args", &self.args)
            .finish()
    }
}

/// Step-by-step construction of a [`Rule`] where every part is mandatory
pub struct RuleBuilder<T: ?Sized> {
    code: Option<String>,
    message: Option<String>,
    args: Vec<JsonValue>,
    predicate: Option<Arc<dyn Predicate<T>>>,
}

impl<T: ?Sized + 'static> RuleBuilder<T> {
    pub fn new() -> Self {
        Self {
            code: None,
            message: None,
            args: Vec::new(),
            predicate: None,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<JsonValue>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate<T> + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Finish the rule. Code, message and predicate are all mandatory.
    pub fn build(self) -> Result<Rule<T>> {
        let code = self
            .code
            .ok_or_else(|| ValidatorError::configuration("Rule is missing an error code"))?;
        let message = self
            .message
            .ok_or_else(|| ValidatorError::configuration("Rule is missing a default message"))?;
        let predicate = self
            .predicate
            .ok_or_else(|| ValidatorError::configuration("Rule is missing a predicate"))?;

        Ok(Rule {
            code,
            message,
            args: self.args,
            predicate,
        })
    }
}

impl<T: ?Sized + 'static> Default for RuleBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
