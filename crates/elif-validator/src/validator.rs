//! The validator: a shared, append-only set of rule chains

use crate::accessor::PropertyAccessor;
use crate::chain::{Constraint, IntoConstraint};
use crate::error::Result;
use crate::introspect::Bean;
use crate::message::{DefaultMessageResolver, MessageResolver};
use crate::result::ValidationResult;
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

type Snapshot = Vec<Arc<dyn Constraint>>;

/// Evaluates every registered chain against a target object.
///
/// Chains are published copy-on-write: `add` swaps in a new snapshot and
/// each `validate` call iterates the snapshot it loaded on entry, so
/// validation never blocks on registration. Share it through `Arc`.
pub struct Validator {
    chains: ArcSwap<Snapshot>,
    accessor: Arc<PropertyAccessor>,
    resolver: Arc<dyn MessageResolver>,
}

impl Validator {
    /// Create a validator with a fresh accessor and no chains
    pub fn new() -> Self {
        Self {
            chains: ArcSwap::from_pointee(Vec::new()),
            accessor: Arc::new(PropertyAccessor::new()),
            resolver: Arc::new(DefaultMessageResolver),
        }
    }

    /// Build a validator from a list of chains; the first bad one fails it
    pub fn from_chains<I, C>(chains: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: IntoConstraint,
    {
        let chains = chains
            .into_iter()
            .map(IntoConstraint::into_constraint)
            .collect::<Result<Snapshot>>()?;

        Ok(Self {
            chains: ArcSwap::from_pointee(chains),
            ..Self::new()
        })
    }

    /// Share a reader cache with other validators
    pub fn with_accessor(mut self, accessor: Arc<PropertyAccessor>) -> Self {
        self.accessor = accessor;
        self
    }

    /// Resolver handed to every result this validator produces
    pub fn with_message_resolver(mut self, resolver: Arc<dyn MessageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// The accessor shared by all validations
    pub fn accessor(&self) -> &Arc<PropertyAccessor> {
        &self.accessor
    }

    /// Publish a chain to every `validate` call that starts afterwards
    pub fn add(&self, chain: impl IntoConstraint) -> Result<()> {
        let chain = chain.into_constraint()?;
        let previous = self.chains.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.push(Arc::clone(&chain));
            next
        });

        debug!(
            "Registered rule chain for '{}' with {} rule(s), {} chain(s) total",
            chain.path(),
            chain.rule_count(),
            previous.len() + 1
        );
        Ok(())
    }

    /// Run every chain against `target`.
    ///
    /// Configuration faults, broken associations and reader failures are
    /// returned as `Err`; failed rules are collected in the result.
    pub fn validate(&self, target: &dyn Bean) -> Result<ValidationResult> {
        let chains = self.chains.load_full();
        let mut result = ValidationResult::with_message_resolver(Arc::clone(&self.resolver));

        for chain in chains.iter() {
            let value = self.accessor.resolve(target, chain.path())?;
            if let Some(error) = chain.evaluate(&value)? {
                trace!("Chain for '{}' failed with '{}'", error.field(), error.code());
                result.add_error(error);
            }
        }

        Ok(result)
    }

    /// True when `validate` reports no errors
    pub fn is_valid(&self, target: &dyn Bean) -> Result<bool> {
        Ok(self.validate(target)?.is_valid())
    }

    /// The current snapshot of chains
    pub fn chains(&self) -> Arc<Snapshot> {
        self.chains.load_full()
    }

    /// Number of registered chains
    pub fn len(&self) -> usize {
        self.chains.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.load().is_empty()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field(
                "chains",
                &self
                    .chains
                    .load()
                    .iter()
                    .map(|chain| chain.path().as_str().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("accessor", &self.accessor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{integer, text};
    use crate::value::Value;

    #[derive(Default)]
    struct Account {
        login: Option<String>,
        age: Option<i32>,
    }

    crate::introspect!(Account {
        "login" => |a: &Account| a.login.clone(),
        "age" => |a: &Account| a.age,
    });

    #[test]
    fn test_collects_one_error_per_failing_chain() {
        let validator = Validator::from_chains([
            text("login").required().min_length(3),
            text("login").max_length(5),
        ])
        .unwrap();
        validator.add(integer("age").required().min(18)).unwrap();

        let account = Account {
            login: Some("ab".into()),
            age: Some(12),
        };
        let result = validator.validate(&account).unwrap();
        let codes: Vec<_> = result.errors().iter().map(|e| e.code()).collect();
        assert_eq!(codes, ["validator.string.min.length", "validator.integer.min"]);
    }

    #[test]
    fn test_same_field_can_fail_in_several_chains() {
        let validator = Validator::from_chains([
            text("login").min_length(10),
            text("login").pattern("[0-9]+"),
        ])
        .unwrap();

        let account = Account {
            login: Some("abc".into()),
            age: None,
        };
        let result = validator.validate(&account).unwrap();
        assert_eq!(result.errors_for("login").count(), 2);
    }

    #[test]
    fn test_add_reports_builder_faults() {
        let validator = Validator::new();
        let err = validator
            .add(integer("age").with_error_code("too.early"))
            .unwrap_err();
        assert!(err.is_illegal_state());
        assert!(validator.is_empty());
    }

    #[test]
    fn test_unknown_property_propagates() {
        let validator = Validator::new();
        validator.add(text("email").required()).unwrap();

        let err = validator.validate(&Account::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_shared_accessor_cache() {
        let accessor = Arc::new(PropertyAccessor::new());
        let first = Validator::new().with_accessor(accessor.clone());
        let second = Validator::new().with_accessor(accessor.clone());
        first.add(text("login").required()).unwrap();
        second.add(integer("age").required()).unwrap();

        assert!(!first.is_valid(&Account::default()).unwrap());
        assert!(!second.is_valid(&Account::default()).unwrap());
        assert_eq!(accessor.len(), 2);
    }

    #[test]
    fn test_snapshot_is_stable_across_add() {
        let validator = Validator::new();
        validator.add(text("login").required()).unwrap();
        let before = validator.chains();

        validator.add(integer("age").required()).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(validator.len(), 2);
    }

    #[test]
    fn test_validates_json_objects() {
        let validator = Validator::from_chains([text("name").required()]).unwrap();
        let Value::Object(user) = Value::from(serde_json::json!({ "nickname": "ada" })) else {
            unreachable!()
        };

        let result = validator.validate(user.as_ref()).unwrap();
        assert_eq!(result.errors()[0].field(), "name");
    }
}
