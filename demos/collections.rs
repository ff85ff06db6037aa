//! Collections and Maps
//!
//! This example validates nested structs, slices and maps.
//!
//! Key concepts:
//! - `dive` applies the following rules to every element
//! - `keys ... endkeys` validates map keys separately from values
//! - Nested structs are validated automatically, even behind `Option`
//! - Errors carry paths such as `addresses[1].city`, `schools[S].name` for a
//!   map value and `schools{S}` for a map key
//!
//! Run with: cargo run --example collections

use std::collections::HashMap;
use tagcheck::prelude::*;
use tagcheck::validatable;

validatable! {
    #[derive(Debug, Clone)]
    struct Address {
        city: String => "required",
        country: String => "required",
    }
}

validatable! {
    #[derive(Debug, Clone)]
    struct School {
        name: String => "required",
    }
}

validatable! {
    #[derive(Debug, Clone)]
    struct User {
        id: String => "required",
        name: String => "required",
        addresses: Vec<Option<Address>> => "required,dive",
        hobbies: Vec<String> => "dive,required,min=3",
        schools: HashMap<String, School> => "dive,keys,required,min=2,endkeys",
    }
}

fn address(city: &str, country: &str) -> Option<Address> {
    Some(Address {
        city: city.to_string(),
        country: country.to_string(),
    })
}

fn school(name: &str) -> School {
    School {
        name: name.to_string(),
    }
}

fn show(label: &str, outcome: Outcome) {
    println!("\n{label}:");
    match outcome {
        Validation::Success(_) => println!("  ✓ valid"),
        Validation::Failure(errors) => {
            for error in FieldErrors::from_failures(&errors).iter() {
                println!("  ✗ {error}");
            }
        }
    }
}

fn main() -> Result<(), EngineError> {
    println!("=== Collections and Maps Example ===");

    let validator = Validator::new();

    let user = User {
        id: "1".to_string(),
        name: "Adib Hauzan Sofyan".to_string(),
        addresses: vec![address("Bandung", "Indonesia"), address("Padang", "Indonesia")],
        hobbies: vec![
            "Main Game".to_string(),
            "Belajar".to_string(),
            "Berenang".to_string(),
        ],
        schools: HashMap::from([
            ("SD".to_string(), school("SDN 14 Laing")),
            ("SMP".to_string(), school("SMPN 30 Padang")),
            ("Kuliah".to_string(), school("Universitas Logistik")),
        ]),
    };
    show("Complete user", validator.validate(&user)?);

    let mut broken = user.clone();
    broken.addresses.push(address("", "Indonesia"));
    broken.hobbies.push("Go".to_string());
    broken.schools.insert("S".to_string(), school(""));
    show("Broken user", validator.validate(&broken)?);

    // Only some top-level fields.
    show(
        "Broken user, hobbies only",
        validator.validate_fields(&broken, &["hobbies"])?,
    );

    // Single values use the same tags.
    show("Empty string", validator.validate_var(&"", "required")?);
    show(
        "Scores",
        validator.validate_var(&vec![90, 101, 75], "dive,lte=100")?,
    );

    Ok(())
}
