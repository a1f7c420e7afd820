//! `check` subcommand handler

use crate::utils::parse_value_literal;
use std::process;

/// Validate one JSON value literal against one typespec
pub fn handle_check(typespec: &str, literal: &str) {
    let value = match parse_value_literal(literal) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error parsing value literal '{literal}': {err}");
            process::exit(1);
        }
    };

    match argus_core::check(typespec, Some(&value)) {
        Ok(()) => println!("OK"),
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            process::exit(1);
        }
    }
}
