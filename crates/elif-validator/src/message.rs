//! Locale-aware message resolution

use crate::error::{ValidationError, ValidatorError};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use service_builder::builder;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("valid regex"));

/// A language tag such as `en`, `en-US` or `el_GR`.
///
/// Underscores become dashes, the language is lowercased and a two letter
/// region is uppercased, so `el_gr` and `el-GR` are the same locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Normalize a tag: `el_gr`, `EL-gr` and `el-GR` all become `el-GR`
    pub fn new(tag: impl AsRef<str>) -> Self {
        let normalized = tag
            .as_ref()
            .trim()
            .split(['-', '_'])
            .enumerate()
            .map(|(i, part)| match i {
                0 => part.to_ascii_lowercase(),
                _ if part.len() == 2 => part.to_ascii_uppercase(),
                _ => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("-");
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language subtag, `en` for `en-US`
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// True for tags like `en-US`
    pub fn has_region(&self) -> bool {
        self.0.contains('-')
    }

    /// Locale reduced to its language, `None` when it already is one
    pub fn language_only(&self) -> Option<Locale> {
        self.has_region().then(|| Locale(self.language().to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Locale::new(tag)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale::new(tag)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Locale::new(s))
    }
}

/// Turns a validation error into a user-facing message
pub trait MessageResolver: Send + Sync {
    fn resolve(&self, error: &ValidationError, locale: Option<&Locale>) -> String;
}

impl<F> MessageResolver for F
where
    F: Fn(&ValidationError, Option<&Locale>) -> String + Send + Sync,
{
    fn resolve(&self, error: &ValidationError, locale: Option<&Locale>) -> String {
        self(error, locale)
    }
}

/// Returns the default message verbatim, ignoring code and locale
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageResolver;

impl MessageResolver for DefaultMessageResolver {
    fn resolve(&self, error: &ValidationError, _locale: Option<&Locale>) -> String {
        error.default_message().to_string()
    }
}

/// Message templates per locale and error code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCatalog {
    messages: HashMap<Locale, HashMap<String, String>>,
}

impl MessageCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{ "<locale>": { "<code>": "<template>" } }`
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ValidatorError::configuration(format!("Invalid message catalog JSON: {}", e))
        })
    }

    /// Parse the YAML form of the same shape
    pub fn from_yaml_str(yaml: &str) -> crate::error::Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ValidatorError::configuration(format!("Invalid message catalog YAML: {}", e))
        })
    }

    /// Add or replace the template for `code` in `locale`
    pub fn insert(
        &mut self,
        locale: impl Into<Locale>,
        code: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.messages
            .entry(locale.into())
            .or_default()
            .insert(code.into(), template.into());
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_message(
        mut self,
        locale: impl Into<Locale>,
        code: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.insert(locale, code, template);
        self
    }

    /// Exact lookup, no fallback
    pub fn get(&self, locale: &Locale, code: &str) -> Option<&str> {
        self.messages
            .get(locale)
            .and_then(|codes| codes.get(code))
            .map(String::as_str)
    }

    /// Lookup that falls back from `en-US` to `en`
    pub fn lookup(&self, locale: &Locale, code: &str) -> Option<&str> {
        self.get(locale, code).or_else(|| {
            locale
                .language_only()
                .and_then(|language| self.get(&language, code))
        })
    }

    /// Locales with at least one template
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.messages.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.values().all(HashMap::is_empty)
    }
}

/// How [`CatalogResolver`] picks and renders messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[builder]
pub struct MessageConfig {
    /// Locale used when the caller passes none, and as last catalog fallback
    #[builder(default = "String::from(\"en\")")]
    pub default_locale: String,

    /// Try `en` when `en-US` has no entry
    #[builder(default = "true")]
    pub fallback_to_language: bool,

    /// Substitute arguments into default messages too
    #[builder(default = "true")]
    pub format_default_message: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            default_locale: String::from("en"),
            fallback_to_language: true,
            format_default_message: true,
        }
    }
}

impl MessageConfigBuilder {
    /// Exact locale matches only
    pub fn strict(self) -> Self {
        self.fallback_to_language(false)
    }

    pub fn default_locale_tag(self, tag: impl Into<String>) -> Self {
        self.default_locale(tag.into())
    }

    pub fn build_config(self) -> MessageConfig {
        self.build_with_defaults().unwrap_or_default()
    }
}

/// Resolves messages from a [`MessageCatalog`].
///
/// Order: requested locale, its language, the default locale, then the
/// error's default message.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog: MessageCatalog,
    config: MessageConfig,
    default_locale: Locale,
}

impl CatalogResolver {
    /// Create a resolver over `catalog` with explicit settings
    pub fn new(catalog: MessageCatalog, config: MessageConfig) -> Self {
        let default_locale = Locale::new(&config.default_locale);
        Self {
            catalog,
            config,
            default_locale,
        }
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn find(&self, locale: &Locale, code: &str) -> Option<&str> {
        if self.config.fallback_to_language {
            self.catalog.lookup(locale, code)
        } else {
            self.catalog.get(locale, code)
        }
    }
}

impl From<MessageCatalog> for CatalogResolver {
    fn from(catalog: MessageCatalog) -> Self {
        CatalogResolver::new(catalog, MessageConfig::default())
    }
}

impl MessageResolver for CatalogResolver {
    fn resolve(&self, error: &ValidationError, locale: Option<&Locale>) -> String {
        let requested = locale.unwrap_or(&self.default_locale);

        let template = self
            .find(requested, error.code())
            .or_else(|| self.find(&self.default_locale, error.code()));

        match template {
            Some(template) => format_message(template, error.args()),
            None if self.config.format_default_message => {
                format_message(error.default_message(), error.args())
            }
            None => error.default_message().to_string(),
        }
    }
}

/// Replace `{0}`, `{1}`, ... with the matching argument.
///
/// Placeholders without a matching argument are kept as written.
pub fn format_message(template: &str, args: &[JsonValue]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .map(display_arg)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strings unquoted, arrays joined with `, `
pub fn display_arg(arg: &JsonValue) -> String {
    match arg {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(display_arg).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
