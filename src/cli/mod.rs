//! The H2ML command-line interface.
//!
//! Entry point for all CLI commands; orchestrates the core library
//! functions and renders fatal errors through miette.

use std::path::Path;
use std::{fs, process};

use clap::Parser;
use miette::IntoDiagnostic;

use crate::cli::args::{Command, H2mlArgs, OptionFlags};
use crate::engine::compile;
use crate::options::CompilerOptions;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = H2mlArgs::parse();

    let result = match args.command {
        Command::Compile { file, flags } => handle_compile(&file, &flags),
        Command::Templates { file, flags } => handle_templates(&file, &flags),
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

fn handle_compile(file: &Path, flags: &OptionFlags) -> miette::Result<()> {
    let input = fs::read_to_string(file).into_diagnostic()?;
    let options = load_options(flags)?;
    let expansion = compile(&input, &options)?;
    println!("{}", expansion.document);
    Ok(())
}

fn handle_templates(file: &Path, flags: &OptionFlags) -> miette::Result<()> {
    let input = fs::read_to_string(file).into_diagnostic()?;
    let options = load_options(flags)?;
    let expansion = compile(&input, &options)?;
    if expansion.templates.is_empty() {
        println!("(no templates)");
        return Ok(());
    }
    let mut names: Vec<&String> = expansion.templates.keys().collect();
    names.sort();
    for name in names {
        println!("{name}:");
        println!("{}", expansion.templates[name]);
    }
    Ok(())
}

fn load_options(flags: &OptionFlags) -> miette::Result<CompilerOptions> {
    let mut options = match &flags.options {
        Some(path) => {
            let text = fs::read_to_string(path).into_diagnostic()?;
            serde_json::from_str(&text).into_diagnostic()?
        }
        None => CompilerOptions::default(),
    };
    flags.apply(&mut options);
    Ok(options)
}
