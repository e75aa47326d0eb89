//! # elif-validator
//!
//! Declarative property validation for arbitrary objects.
//! Rule chains are composed per property path with a fluent DSL, registered
//! with a shared [`Validator`], and evaluated against any type that exposes
//! its properties through [`Introspect`].
//!
//! ```
//! use elif_validator::{dsl::{integer, text}, introspect, Validator};
//!
//! #[derive(Default)]
//! struct Signup { email: Option<String>, age: Option<i32> }
//!
//! introspect!(Signup {
//!     "email" => |s: &Signup| s.email.clone(),
//!     "age" => |s: &Signup| s.age,
//! });
//!
//! let validator = Validator::new();
//! validator.add(text("email").required().email())?;
//! validator.add(integer("age").required().min(18))?;
//!
//! let result = validator.validate(&Signup::default())?;
//! assert_eq!(result.len(), 2);
//! # Ok::<(), elif_validator::ValidatorError>(())
//! ```

pub mod accessor;
pub mod chain;
pub mod dsl;
pub mod error;
pub mod formats;
pub mod introspect;
pub mod kind;
pub mod message;
pub mod result;
pub mod rules;
pub mod validator;
pub mod value;

// Re-exports for easy access
pub use accessor::PropertyAccessor;
pub use chain::{Constraint, IntoConstraint, RuleChain, RuleChainBuilder};
pub use error::{BoxError, Result, ValidationError, ValidationErrors, ValidatorError};
pub use introspect::{Bean, Getter, Introspect, PropertyReader};
pub use message::{
    CatalogResolver, DefaultMessageResolver, Locale, MessageCatalog, MessageConfig,
    MessageConfigBuilder, MessageResolver,
};
pub use result::ValidationResult;
pub use rules::{Predicate, Rule, RuleBuilder};
pub use validator::Validator;
pub use value::{PropertyPath, Value};

// Built-in formats
pub use formats::{CreditCardFormat, EmailFormat, IsbnFormat, PatternFormat, UrlFormat};
