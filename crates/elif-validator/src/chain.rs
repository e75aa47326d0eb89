//! Rule chains: ordered, short-circuiting rules guarding one property path

use crate::error::{Result, ValidationError, ValidatorError};
use crate::kind::ValueKind;
use crate::rules::{Predicate, Rule};
use crate::value::{PropertyPath, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub const REQUIRED_CODE: &str = "validator.required";
pub const REQUIRED_MESSAGE: &str = "This is a required property";

/// Object-safe view of a frozen chain, whatever its kind
pub trait Constraint: Send + Sync {
    fn path(&self) -> &PropertyPath;

    fn is_required(&self) -> bool;

    fn rule_count(&self) -> usize;

    /// At most one error: the first failing rule wins
    fn evaluate(&self, value: &Value) -> Result<Option<ValidationError>>;
}

/// Anything a [`Validator`](crate::Validator) accepts as a chain
pub trait IntoConstraint {
    fn into_constraint(self) -> Result<Arc<dyn Constraint>>;
}

/// An immutable chain produced by [`RuleChainBuilder::build`]
pub struct RuleChain<K: ValueKind> {
    path: PropertyPath,
    required: bool,
    rules: Vec<Rule<K::Target>>,
    kind: PhantomData<K>,
}

impl<K: ValueKind> RuleChain<K> {
    /// The property path this chain guards
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Whether null and empty values are rejected
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Rules in evaluation order, the required rule first when present
    pub fn rules(&self) -> &[Rule<K::Target>] {
        &self.rules
    }

    /// Evaluate an already resolved value.
    ///
    /// Null short-circuits to the required error or to a pass. A value that
    /// does not coerce to the chain's kind is a configuration fault.
    pub fn evaluate(&self, value: &Value) -> Result<Option<ValidationError>> {
        if value.is_null() {
            return Ok(match self.rules.first() {
                Some(required) if self.required => Some(required.to_error(&self.path)),
                _ => None,
            });
        }

        let target = K::coerce(value).ok_or_else(|| {
            ValidatorError::type_mismatch(self.path.as_str(), K::NAME, value.kind_name())
        })?;

        if !self.required && !K::is_present(&target) {
            return Ok(None);
        }

        Ok(self
            .rules
            .iter()
            .find(|rule| !rule.test(&target))
            .map(|rule| rule.to_error(&self.path)))
    }

    /// Evaluate a standalone value without a target object
    pub fn check(&self, value: impl Into<Value>) -> Result<Option<ValidationError>> {
        self.evaluate(&value.into())
    }

    /// Shorthand for `check(value)?.is_none()`
    pub fn is_valid(&self, value: impl Into<Value>) -> Result<bool> {
        Ok(self.check(value)?.is_none())
    }
}

impl<K: ValueKind> Clone for RuleChain<K> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            required: self.required,
            rules: self.rules.clone(),
            kind: PhantomData,
        }
    }
}

impl<K: ValueKind> fmt::Debug for RuleChain<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("path", &self.path.as_str())
            .field("kind", &K::NAME)
            .field("required", &self.required)
            .field("rules", &self.rules)
            .finish()
    }
}

impl<K: ValueKind> Constraint for RuleChain<K> {
    fn path(&self) -> &PropertyPath {
        &self.path
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn evaluate(&self, value: &Value) -> Result<Option<ValidationError>> {
        RuleChain::evaluate(self, value)
    }
}

/// Fluent construction of a [`RuleChain`].
///
/// Misuse (a bad path, an override before any rule, an invalid argument)
/// is recorded and reported by [`build`](Self::build), so calls can be
/// chained without intermediate `?`.
pub struct RuleChainBuilder<K: ValueKind> {
    path: Option<PropertyPath>,
    required: bool,
    rules: Vec<Rule<K::Target>>,
    last: Option<usize>,
    fault: Option<ValidatorError>,
    kind: PhantomData<K>,
}

impl<K: ValueKind> RuleChainBuilder<K> {
    /// Start a chain for a dotted path like `address.city`
    pub fn new(path: &str) -> Self {
        let (path, fault) = match PropertyPath::parse(path) {
            Ok(path) => (Some(path), None),
            Err(fault) => (None, Some(fault)),
        };

        Self {
            path,
            required: false,
            rules: Vec::new(),
            last: None,
            fault,
            kind: PhantomData,
        }
    }

    /// The parsed path, `None` when parsing failed
    pub fn path(&self) -> Option<&PropertyPath> {
        self.path.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Reject null and, for the chain's kind, empty values.
    ///
    /// The required rule always runs first. Calling this twice adds nothing.
    /// It only becomes the target of `with_error_code` and
    /// `with_default_message` when no other rule has been appended yet.
    pub fn required(mut self) -> Self {
        if !self.required {
            let rule = Rule::new(REQUIRED_CODE, REQUIRED_MESSAGE, |value: &K::Target| {
                K::is_present(value)
            });
            self.rules.insert(0, rule);
            self.required = true;
            self.last = Some(self.last.map_or(0, |index| index + 1));
        }
        self
    }

    /// Override the error code of the most recently added rule
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        let Some(index) = self.last else {
            return self.fail(ValidatorError::illegal_state(
                "You can't specify a custom error code before adding a rule",
            ));
        };
        self.rules[index].set_code(code.into());
        self
    }

    /// Override the default message of the most recently added rule
    pub fn with_default_message(mut self, message: impl Into<String>) -> Self {
        let Some(index) = self.last else {
            return self.fail(ValidatorError::illegal_state(
                "You can't specify a custom default message before adding a rule",
            ));
        };
        self.rules[index].set_message(message.into());
        self
    }

    /// Append a prebuilt rule
    pub fn rule(mut self, rule: Rule<K::Target>) -> Self {
        self.rules.push(rule);
        self.last = Some(self.rules.len() - 1);
        self
    }

    /// Append a rule from a predicate
    pub fn satisfies<P>(
        self,
        code: impl Into<String>,
        message: impl Into<String>,
        predicate: P,
    ) -> Self
    where
        P: Predicate<K::Target> + 'static,
    {
        self.rule(Rule::new(code, message, predicate))
    }

    /// The value must equal one of `values`
    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<K::Target>,
        K::Target: PartialEq,
    {
        let allowed: Vec<K::Target> = values.into_iter().map(Into::into).collect();
        let message = format!(
            "This must be one of: {}",
            allowed.iter().map(K::describe).collect::<Vec<_>>().join(", ")
        );
        let args = allowed.iter().map(K::to_arg).collect();

        self.rule(
            Rule::new("validator.in", message, move |value: &K::Target| {
                allowed.contains(value)
            })
            .with_args(args),
        )
    }

    /// Freeze the chain, or report the first recorded fault
    pub fn build(self) -> Result<RuleChain<K>> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        let path = self
            .path
            .ok_or_else(|| ValidatorError::configuration("Rule chain has no property path"))?;

        Ok(RuleChain {
            path,
            required: self.required,
            rules: self.rules,
            kind: PhantomData,
        })
    }

    pub(crate) fn fail(mut self, fault: ValidatorError) -> Self {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
        self
    }
}

impl<K: ValueKind> fmt::Debug for RuleChainBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChainBuilder")
            .field("path", &self.path.as_ref().map(PropertyPath::as_str))
            .field("kind", &K::NAME)
            .field("required", &self.required)
            .field("rules", &self.rules.len())
            .field("fault", &self.fault)
            .finish()
    }
}

impl<K: ValueKind> IntoConstraint for RuleChainBuilder<K> {
    fn into_constraint(self) -> Result<Arc<dyn Constraint>> {
        Ok(Arc::new(self.build()?))
    }
}

impl<K: ValueKind> IntoConstraint for RuleChain<K> {
    fn into_constraint(self) -> Result<Arc<dyn Constraint>> {
        Ok(Arc::new(self))
    }
}

impl IntoConstraint for Arc<dyn Constraint> {
    fn into_constraint(self) -> Result<Arc<dyn Constraint>> {
        Ok(self)
    }
}
