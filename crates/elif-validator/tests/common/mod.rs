//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc};
use elif_validator::dsl::{date, integer, text};
use elif_validator::{introspect, Validator, Value};

#[derive(Debug, Clone, Default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<Address>,
}

/// Every field unset, but with an (empty) address attached
impl Default for Person {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
            age: None,
            birthdate: None,
            address: Some(Address::default()),
        }
    }
}

introspect!(Address {
    "street" => |a: &Address| a.street.clone(),
    "city" => |a: &Address| a.city.clone(),
});

introspect!(Person {
    "first_name" => |p: &Person| p.first_name.clone(),
    "last_name" => |p: &Person| p.last_name.clone(),
    "email" => |p: &Person| p.email.clone(),
    "age" => |p: &Person| p.age,
    "birthdate" => |p: &Person| p.birthdate,
    "address" => |p: &Person| p.address.clone().map(Value::object),
});

pub fn valid_person() -> Person {
    Person {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        email: Some("ada@example.com".into()),
        age: Some(19),
        birthdate: Some((Utc::now() - Duration::days(365 * 19)).date_naive()),
        address: Some(Address {
            street: Some("12 St James's Square".into()),
            city: Some("London".into()),
        }),
    }
}

/// Required names, required valid email, adult age and an optional past birthdate
pub fn person_validator() -> Validator {
    let validator = Validator::new();
    validator.add(text("first_name").required()).unwrap();
    validator.add(text("last_name").required()).unwrap();
    validator.add(text("email").required().email()).unwrap();
    validator.add(integer("age").required().min(18)).unwrap();
    validator.add(date("birthdate").in_the_past()).unwrap();
    validator
}
