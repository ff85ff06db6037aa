//! A single validator shared between concurrent tasks.

use std::sync::Arc;
use tagcheck::prelude::*;
use tagcheck::validatable;

validatable! {
    struct Signup {
        email: String => "required,email",
        handle: String => "required,handle",
        age: u8 => "gte=13",
    }
}

fn shared_validator() -> Arc<Validator> {
    let rules = RegistryBuilder::new()
        .register_rule("handle", |fl| {
            fl.as_str()
                .map(|s| s.chars().all(|c| c.is_ascii_lowercase()))
                .unwrap_or(false)
        })
        .unwrap();
    Arc::new(Validator::builder().rules(rules).build().unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_are_independent() {
    let validator = shared_validator();

    let tasks: Vec<_> = (0..32u8)
        .map(|i| {
            let validator = Arc::clone(&validator);
            tokio::spawn(async move {
                let signup = Signup {
                    email: format!("user{i}@example.com"),
                    handle: if i % 2 == 0 { "abc".to_string() } else { "Abc".to_string() },
                    age: 10 + i,
                };
                match validator.validate(&signup).unwrap() {
                    Validation::Success(_) => Vec::new(),
                    Validation::Failure(errors) => FieldErrors::from_failures(&errors)
                        .into_iter()
                        .map(|e| e.path)
                        .collect::<Vec<_>>(),
                }
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let paths = task.await.unwrap();

        let mut expected = Vec::new();
        if i % 2 == 1 {
            expected.push("handle".to_string());
        }
        if 10 + i < 13 {
            expected.push("age".to_string());
        }
        assert_eq!(paths, expected, "task {i}");
    }

    assert_eq!(validator.cached_tags(), 3);
}

#[tokio::test]
async fn validator_is_usable_from_blocking_tasks() {
    let validator = shared_validator();

    let outcome = tokio::task::spawn_blocking(move || {
        validator
            .validate_var(&"not-an-email", "required,email")
            .map(|outcome| outcome.is_failure())
    })
    .await
    .unwrap();

    assert_eq!(outcome, Ok(true));
}
