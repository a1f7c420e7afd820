//! `explain` subcommand handler

use argus_core::{Permutation, Signature};
use serde::Serialize;
use std::process;

#[derive(Serialize)]
struct PermutationReport {
    positions: Vec<Vec<String>>,
    variadic: bool,
}

#[derive(Serialize)]
struct SignatureReport {
    name: String,
    method: bool,
    arguments: Vec<PermutationReport>,
    results: Option<Vec<PermutationReport>>,
}

/// Print every call shape a declaration compiles into
pub fn handle_explain(declaration: &str, as_json: bool) {
    let signature = match Signature::parse(declaration) {
        Ok(signature) => signature,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    if as_json {
        let report = SignatureReport {
            name: signature.name().to_string(),
            method: signature.is_method(),
            arguments: signature
                .argument_permutations()
                .iter()
                .map(permutation_report)
                .collect(),
            results: signature
                .result_permutations()
                .map(|perms| perms.iter().map(permutation_report).collect()),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error serializing report: {err}");
                process::exit(1);
            }
        }
        return;
    }

    println!("{}", signature.name());
    println!("  arguments:");
    print_permutations(signature.argument_permutations());
    if let Some(results) = signature.result_permutations() {
        println!("  results:");
        print_permutations(results);
    }
}

fn permutation_report(perm: &Permutation) -> PermutationReport {
    PermutationReport {
        positions: perm.specs.clone(),
        variadic: perm.dots,
    }
}

fn print_permutations(perms: &[Permutation]) {
    for (i, perm) in perms.iter().enumerate() {
        let positions: Vec<String> = perm.specs.iter().map(|spec| spec.join("|")).collect();
        let tail = if perm.dots { "..." } else { "" };
        if positions.is_empty() {
            println!("    {}. (none)", i + 1);
        } else {
            println!("    {}. {}{}", i + 1, positions.join(", "), tail);
        }
    }
}
