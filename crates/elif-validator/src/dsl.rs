//! Fluent entry points for building rule chains
//!
//! ```
//! use elif_validator::dsl::{integer, text};
//!
//! let name = text("name").required().max_length(50);
//! let age = integer("age").required().min(18).with_error_code("age.adult");
//! # let _ = (name, age);
//! ```

use crate::chain::RuleChainBuilder;
use crate::error::ValidatorError;
use crate::formats::{CreditCardFormat, EmailFormat, IsbnFormat, PatternFormat, UrlFormat};
use crate::kind::{self, NumericKind, TemporalKind};
use crate::rules::{Predicate, Rule};
use serde_json::Value as JsonValue;

/// Chain over any value
pub fn property(path: &str) -> RuleChainBuilder<kind::Dynamic> {
    RuleChainBuilder::new(path)
}

/// Chain over strings
pub fn text(path: &str) -> RuleChainBuilder<kind::Text> {
    RuleChainBuilder::new(path)
}

/// Chain over whole numbers
pub fn integer(path: &str) -> RuleChainBuilder<kind::Integer> {
    RuleChainBuilder::new(path)
}

/// Chain over floating point numbers
pub fn float(path: &str) -> RuleChainBuilder<kind::Float> {
    RuleChainBuilder::new(path)
}

/// Chain over UTC instants
pub fn datetime(path: &str) -> RuleChainBuilder<kind::DateTime> {
    RuleChainBuilder::new(path)
}

/// Chain over calendar dates
pub fn date(path: &str) -> RuleChainBuilder<kind::Date> {
    RuleChainBuilder::new(path)
}

impl RuleChainBuilder<kind::Text> {
    fn text_rule<P>(self, code: &str, message: String, args: Vec<JsonValue>, format: P) -> Self
    where
        P: Predicate<str> + 'static,
    {
        self.rule(
            Rule::new(code, message, move |value: &String| format.test(value)).with_args(args),
        )
    }

    /// At least `min` characters
    pub fn min_length(self, min: usize) -> Self {
        self.text_rule(
            "validator.string.min.length",
            format!("Must not have less than {} characters", min),
            vec![JsonValue::from(min)],
            move |value: &str| value.chars().count() >= min,
        )
    }

    /// At most `max` characters
    pub fn max_length(self, max: usize) -> Self {
        self.text_rule(
            "validator.string.max.length",
            format!("Must not have more than {} characters", max),
            vec![JsonValue::from(max)],
            move |value: &str| value.chars().count() <= max,
        )
    }

    /// The whole value must match `regex`
    pub fn pattern(self, regex: &str) -> Self {
        match PatternFormat::new(regex) {
            Ok(format) => self.text_rule(
                "validator.string.regex",
                format!("Does not match {}", regex),
                vec![JsonValue::from(regex)],
                format,
            ),
            Err(fault) => self.fail(fault),
        }
    }

    /// Must be a well-formed email address
    pub fn email(self) -> Self {
        self.text_rule(
            "validator.string.email",
            "Must be a valid email address".to_string(),
            Vec::new(),
            EmailFormat::new(),
        )
    }

    /// URL with the default schemes; see [`url_with`](Self::url_with)
    pub fn url(self) -> Self {
        self.url_with(UrlFormat::new())
    }

    /// Must be a URL accepted by `format`
    pub fn url_with(self, format: UrlFormat) -> Self {
        self.text_rule(
            "validator.string.url",
            "Must be a valid URL".to_string(),
            Vec::new(),
            format,
        )
    }

    /// Must be an ISBN-10 with a valid checksum
    pub fn isbn(self) -> Self {
        self.text_rule(
            "validator.string.isbn",
            "Must be a valid ISBN".to_string(),
            Vec::new(),
            IsbnFormat::new(),
        )
    }

    /// Must be a card number passing the Luhn check
    pub fn credit_card(self) -> Self {
        self.text_rule(
            "validator.string.credit.card",
            "Must be a valid credit card number".to_string(),
            Vec::new(),
            CreditCardFormat::new(),
        )
    }
}

impl<K> RuleChainBuilder<K>
where
    K: NumericKind,
    K::Target: PartialOrd + Copy,
{
    /// Greater than or equal to `min`
    pub fn min(self, min: impl Into<K::Target>) -> Self {
        let min = min.into();
        self.rule(
            Rule::new(
                format!("{}.min", K::CODE_PREFIX),
                format!("Must be greater than or equal to {}", K::describe(&min)),
                move |value: &K::Target| *value >= min,
            )
            .with_args(vec![K::to_arg(&min)]),
        )
    }

    /// Less than or equal to `max`
    pub fn max(self, max: impl Into<K::Target>) -> Self {
        let max = max.into();
        self.rule(
            Rule::new(
                format!("{}.max", K::CODE_PREFIX),
                format!("Must be less than or equal to {}", K::describe(&max)),
                move |value: &K::Target| *value <= max,
            )
            .with_args(vec![K::to_arg(&max)]),
        )
    }

    /// Between `min` and `max`, both inclusive
    pub fn range(self, min: impl Into<K::Target>, max: impl Into<K::Target>) -> Self {
        let (min, max) = (min.into(), max.into());
        if min > max {
            return self.fail(ValidatorError::invalid_argument(format!(
                "Range minimum {} is greater than maximum {}",
                K::describe(&min),
                K::describe(&max)
            )));
        }

        self.rule(
            Rule::new(
                format!("{}.range", K::CODE_PREFIX),
                format!(
                    "Must be between {} and {}",
                    K::describe(&min),
                    K::describe(&max)
                ),
                move |value: &K::Target| min <= *value && *value <= max,
            )
            .with_args(vec![K::to_arg(&min), K::to_arg(&max)]),
        )
    }
}

impl<K> RuleChainBuilder<K>
where
    K: TemporalKind,
    K::Target: PartialOrd,
{
    /// Strictly before the moment of evaluation
    pub fn in_the_past(self) -> Self {
        self.satisfies("validator.date.past", "Must be a date in the past", |value: &K::Target| {
            *value < K::now()
        })
    }

    /// Strictly after the moment of evaluation
    pub fn in_the_future(self) -> Self {
        self.satisfies("validator.date.future", "Must be a future date", |value: &K::Target| {
            *value > K::now()
        })
    }

    /// Must fall strictly before `limit`
    pub fn before(self, limit: impl Into<K::Target>) -> Self {
        let limit = limit.into();
        let message = format!("Must be a date before {}", K::describe(&limit));
        let args = vec![K::to_arg(&limit)];
        self.rule(
            Rule::new("validator.date.before", message, move |value: &K::Target| *value < limit)
                .with_args(args),
        )
    }

    /// Must fall strictly after `limit`
    pub fn after(self, limit: impl Into<K::Target>) -> Self {
        let limit = limit.into();
        let message = format!("Must be a date after {}", K::describe(&limit));
        let args = vec![K::to_arg(&limit)];
        self.rule(
            Rule::new("validator.date.after", message, move |value: &K::Target| *value > limit)
                .with_args(args),
        )
    }
}
