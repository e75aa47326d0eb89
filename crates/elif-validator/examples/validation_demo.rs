//! Validating nested objects with rule chains and localized messages

use elif_validator::dsl::{date, integer, text};
use elif_validator::{
    introspect, CatalogResolver, Locale, MessageCatalog, Validator, ValidatorError, Value,
};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Address {
    city: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Customer {
    name: Option<String>,
    email: Option<String>,
    website: Option<String>,
    age: Option<i32>,
    joined: Option<NaiveDate>,
    address: Option<Address>,
}

introspect!(Address {
    "city" => |a: &Address| a.city.clone(),
});

introspect!(Customer {
    "name" => |c: &Customer| c.name.clone(),
    "email" => |c: &Customer| c.email.clone(),
    "website" => |c: &Customer| c.website.clone(),
    "age" => |c: &Customer| c.age,
    "joined" => |c: &Customer| c.joined,
    "address" => |c: &Customer| c.address.clone().map(Value::object),
});

const MESSAGES: &str = r#"
en:
  validator.integer.range: "Age must be between {0} and {1}"
el:
  validator.required: "Υποχρεωτικό πεδίο"
  validator.string.email: "Μη έγκυρη διεύθυνση email"
"#;

fn main() -> Result<(), ValidatorError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("elif-validator demo");
    println!("===================\n");

    let catalog = MessageCatalog::from_yaml_str(MESSAGES)?;
    let validator =
        Validator::new().with_message_resolver(Arc::new(CatalogResolver::from(catalog)));

    validator.add(text("name").required().max_length(40))?;
    validator.add(text("email").required().email())?;
    validator.add(text("website").url())?;
    validator.add(integer("age").required().range(18, 120))?;
    validator.add(date("joined").in_the_past())?;
    validator.add(text("address.city").required())?;

    let customers = [
        (
            "complete customer",
            Customer {
                name: Some("Ada Lovelace".into()),
                email: Some("ada@example.com".into()),
                website: Some("https://example.com/ada".into()),
                age: Some(36),
                joined: NaiveDate::from_ymd_opt(2020, 5, 17),
                address: Some(Address {
                    city: Some("London".into()),
                }),
            },
        ),
        ("empty customer", Customer {
            address: Some(Address::default()),
            ..Customer::default()
        }),
        (
            "invalid values",
            Customer {
                name: Some("Charles".into()),
                email: Some("charles@".into()),
                website: Some("gopher://example.com".into()),
                age: Some(12),
                joined: NaiveDate::from_ymd_opt(2999, 1, 1),
                address: Some(Address {
                    city: Some("Paris".into()),
                }),
            },
        ),
    ];

    for (label, customer) in &customers {
        let result = validator.validate(customer)?;
        println!("{}: {} error(s)", label, result.len());

        for locale in [Locale::new("en"), Locale::new("el-GR")] {
            let mut messages: Vec<_> = result.error_messages(Some(&locale)).into_iter().collect();
            messages.sort();
            for (field, message) in messages {
                println!("  [{}] {}: {}", locale, field, message);
            }
        }
        println!();
    }

    // A missing association is a fault, not a validation error
    let orphan = Customer {
        address: None,
        ..customers[0].1.clone()
    };
    match validator.validate(&orphan) {
        Ok(result) => println!("orphan validated with {} error(s)", result.len()),
        Err(err) => println!("orphan rejected: {}", err),
    }

    Ok(())
}
