use clap::{Parser, Subcommand};

mod check;
mod explain;
mod utils;


use check::handle_check;
use explain::handle_explain;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Run-time type checking for dynamically-typed host functions",
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON value literal against a typespec
    Check {
        /// The typespec, e.g. "?int|string" or "table of int"
        typespec: String,
        /// The value as a JSON literal, e.g. '[1, 2, 3]'
        value: String,
    },
    /// Print the compiled permutation table of a declaration
    Explain {
        /// The declaration, e.g. "open(string, [:r|:w|:a]) => file or nil, string"
        declaration: String,
        /// Emit the table as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check { typespec, value } => {
            handle_check(typespec, value);
        }
        Commands::Explain { declaration, json } => {
            handle_explain(declaration, *json);
        }
    }
}
