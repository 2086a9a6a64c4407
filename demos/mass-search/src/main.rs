//! Run a combinatorial mass-match search from the command line and print the ranked
//! matches with name annotations.

use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Parser;
use mzmatch::prelude::*;

#[derive(Debug, Parser)]
struct Cli {
    /// The base values, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    base: Vec<f64>,
    /// The modifier tokens, comma separated; a `+` or `-` prefix restricts a value to
    /// additions or subtractions, unsigned values count for both
    #[arg(long, value_delimiter = ',')]
    modifiers: Vec<String>,
    /// The target value to match
    #[arg(long, conflicts_with = "mz")]
    target: Option<f64>,
    /// An observed m/z to derive targets from, requires --charges
    #[arg(long, requires = "charges")]
    mz: Option<f64>,
    /// The charge states to consider for --mz, comma separated
    #[arg(long, value_delimiter = ',')]
    charges: Vec<u32>,
    /// The tolerance window, either absolute (`0.01`) or relative (`10 ppm`)
    #[arg(long, default_value = "0.1")]
    tolerance: Tolerance,
    /// A JSON file mapping numeric-string keys to names, used instead of the built in
    /// table to annotate matches
    #[arg(long)]
    names: Option<PathBuf>,
    /// Skip the fragment/substitution strategy, it dominates the run time on long base
    /// lists
    #[arg(long)]
    no_fragments: bool,
}

fn main() {
    let args = Cli::parse();

    let entries: Vec<ModifierEntry> = args
        .modifiers
        .iter()
        .map(|token| ModifierEntry::from(token.as_str()))
        .collect();
    let modifiers = normalize(&entries);

    let target_spec = match (args.target, args.mz) {
        (Some(target), None) => TargetSpec::Single(target),
        (None, Some(reference)) => TargetSpec::MassOverCharge {
            reference,
            charges: args.charges.clone(),
        },
        _ => {
            eprintln!("provide either --target or --mz with --charges");
            std::process::exit(2);
        }
    };

    let strategies = Strategies {
        fragment_substitution: !args.no_fragments,
        ..Strategies::ALL
    };

    let mut names = NameMap::default_names();
    if let Some(path) = &args.names {
        match File::open(path)
            .map_err(|error| error.to_string())
            .and_then(|file| {
                serde_json::from_reader::<_, NameMap>(BufReader::new(file))
                    .map_err(|error| error.to_string())
            }) {
            Ok(extra) => names = extra,
            Err(error) => {
                eprintln!("could not read names file: {error}");
                std::process::exit(2);
            }
        }
    }

    let matches = match search_with_progress(
        &args.base,
        &modifiers,
        &target_spec,
        args.tolerance,
        strategies,
        |count| eprint!("\revaluated {count} combinations"),
    ) {
        Ok(matches) => matches,
        Err(error) => {
            eprintln!("nothing to search: {error}");
            std::process::exit(2);
        }
    };
    eprintln!();

    if matches.is_empty() {
        println!("No matches within ±{}", args.tolerance);
        return;
    }
    println!("Found {} matches within ±{}", matches.len(), args.tolerance);
    for found in &matches {
        let label = found
            .target_label
            .as_deref()
            .map(|label| format!(" [{label}]"))
            .unwrap_or_default();
        println!(
            "{} = {:.5} (error: {:.5}, steps: {}){label}",
            found.description, found.value, found.error, found.steps
        );
        for name in names.annotate(found, args.tolerance) {
            println!("  -> {name}");
        }
    }
}
