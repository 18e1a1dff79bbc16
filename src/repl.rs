use crate::interpreter::SymbolTable;
use crate::runner;
use std::io::{self, Write};

/// Interactive shell. One global scope persists across lines, so bindings
/// made on one line are visible on the next.
pub fn start() {
    println!("Basil Interpreter v0.1.0");
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut globals = SymbolTable::global();

    loop {
        print!("basil > ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }

                match runner::run("<stdin>", line, &mut globals) {
                    Ok(Some(value)) => println!("{}", value),
                    Ok(None) => {}
                    Err(error) => eprintln!("{}", error),
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}
