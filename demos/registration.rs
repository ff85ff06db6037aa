//! Registration Form
//!
//! This example validates a sign-up form with built-in, cross-field and
//! custom rules.
//!
//! Key concepts:
//! - Declaring tagged structs with `validatable!`
//! - Comparing sibling fields with `eqfield`
//! - Registering a custom rule and an alias before the validator is built
//! - Telling data errors apart from misconfigured rules
//!
//! Run with: cargo run --example registration

use tagcheck::prelude::*;
use tagcheck::validatable;

validatable! {
    #[derive(Debug, Clone)]
    struct RegisterUser {
        user_name: String => "required,email",
        handle: String => "required,username",
        password: String => "password",
        confirm_password: String => "password,eqfield=password",
        age: u8 => "gte=13,lte=130",
    }
}

fn must_valid_username(fl: &FieldLevel<'_>) -> bool {
    match fl.as_str() {
        Some(value) => value == value.to_uppercase() && value.chars().count() >= 5,
        None => true,
    }
}

fn build_validator() -> Result<Validator, Box<dyn std::error::Error>> {
    let rules = RegistryBuilder::new()
        .register_rule("username", must_valid_username)?
        .register_alias("password", "required,min=6")?;

    Ok(Validator::builder().rules(rules).build()?)
}

fn report(label: &str, validator: &Validator, user: &RegisterUser) {
    println!("\n{label}:");
    match validator.validate(user) {
        Ok(Validation::Success(_)) => println!("  ✓ valid"),
        Ok(Validation::Failure(errors)) => {
            for error in FieldErrors::from_failures(&errors).iter() {
                println!(
                    "  ✗ {} failed '{}' (param: '{}')",
                    error.path, error.tag, error.param
                );
            }
        }
        Err(fault) => println!("  ! rules are misconfigured: {fault}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Registration Form Example ===");

    let validator = build_validator()?;

    let valid = RegisterUser {
        user_name: "adibhauzan48@gmail.com".to_string(),
        handle: "ADIBH".to_string(),
        password: "adib123123".to_string(),
        confirm_password: "adib123123".to_string(),
        age: 27,
    };
    report("Valid registration", &validator, &valid);

    let mut invalid = valid.clone();
    invalid.user_name = "adib".to_string();
    invalid.handle = "adib".to_string();
    invalid.confirm_password = "adib12312".to_string();
    invalid.age = 9;
    report("Invalid registration", &validator, &invalid);

    // Without the custom rule the tags cannot be evaluated at all.
    report("Plain validator", &Validator::new(), &valid);

    let json = match validator.validate(&invalid)? {
        Validation::Failure(errors) => FieldErrors::from_failures(&errors).to_json(),
        Validation::Success(_) => serde_json::json!({ "errors": [] }),
    };
    println!("\nAs JSON:\n{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}
