mod ast;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod position;
mod repl;
mod runner;
mod value;

use clap::{Arg, Command};
use interpreter::SymbolTable;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = Command::new("basil")
        .about("A small interpreted expression language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("interactive") {
        repl::start();
        return ExitCode::SUCCESS;
    }

    match matches.get_one::<String>("file") {
        Some(file_path) => run_file(file_path),
        None => {
            repl::start();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let path = Path::new(path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error reading file '{}': {}", path.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let name = path.to_string_lossy();
    let mut globals = SymbolTable::global();

    match runner::run(&name, &source, &mut globals) {
        Ok(Some(value)) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(error) => {
            error.report(&source);
            ExitCode::FAILURE
        }
    }
}
