//! A shared validator under concurrent validation and registration

mod common;

use std::sync::Arc;

use common::{person_validator, valid_person, Person};
use elif_validator::dsl::text;
use elif_validator::Validator;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_validation_is_consistent() {
    init_tracing();
    let validator = Arc::new(person_validator());

    let mut handles = vec![];
    for i in 0..32 {
        let validator = validator.clone();
        let handle = tokio::task::spawn_blocking(move || {
            if i % 2 == 0 {
                validator.validate(&Person::default()).unwrap().len()
            } else {
                validator.validate(&valid_person()).unwrap().len()
            }
        });
        handles.push((i, handle));
    }

    for (i, handle) in handles {
        let errors = handle.await.unwrap();
        assert_eq!(errors, if i % 2 == 0 { 4 } else { 0 });
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_add_during_validation_sees_whole_snapshots() {
    init_tracing();
    const ADDED: usize = 16;

    let validator = Arc::new(person_validator());
    let baseline = validator.len();

    let writer = {
        let validator = validator.clone();
        tokio::task::spawn_blocking(move || {
            for _ in 0..ADDED {
                validator.add(text("address.city").required()).unwrap();
            }
        })
    };

    let mut readers = vec![];
    for _ in 0..8 {
        let validator = validator.clone();
        readers.push(tokio::task::spawn_blocking(move || {
            let mut seen = Vec::new();
            for _ in 0..50 {
                seen.push(validator.validate(&Person::default()).unwrap().len());
            }
            seen
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        let seen = reader.await.unwrap();
        // Every required chain fails on an empty person, so the error count
        // equals the number of required chains in the snapshot that was read.
        for window in seen.windows(2) {
            assert!(window[0] <= window[1]);
        }
        assert!(seen.iter().all(|&n| (4..=4 + ADDED).contains(&n)));
    }

    assert_eq!(validator.len(), baseline + ADDED);
    assert_eq!(validator.validate(&Person::default()).unwrap().len(), 4 + ADDED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accessor_cache_is_shared_across_threads() {
    let validator = Arc::new(Validator::new());
    validator.add(text("address.city").required()).unwrap();
    validator.add(text("first_name").required()).unwrap();

    let mut handles = vec![];
    for _ in 0..16 {
        let validator = validator.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            validator.is_valid(&valid_person()).unwrap()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    // Person.address, Address.city and Person.first_name
    assert_eq!(validator.accessor().len(), 3);
}
