//! Interactive shell.
//!
//! Each line is `<operation> [json arguments]`, `tools`, `help` or `quit`.
//! The whole shell shares one session, so the cart persists between lines.

use serde_json::Value;
use webmcp_tools::InvocationRequest;

use super::terminal::{Terminal, TerminalGate};
use super::{Backend, CliError, dispatcher, new_session};

const HELP: &str = "\
Commands:
  <operation> [json]   invoke an operation, e.g. search_products {\"query\": \"mug\"}
  tools                list operations
  help                 show this help
  quit                 leave the shell";

/// A parsed shell line.
#[derive(Debug, PartialEq)]
enum Line {
    Empty,
    Quit,
    Help,
    Tools,
    Invoke { operation: String, arguments: Value },
}

fn parse_line(line: &str) -> Result<Line, serde_json::Error> {
    let line = line.trim();
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));

    Ok(match head {
        "" => Line::Empty,
        "quit" | "exit" => Line::Quit,
        "help" | "?" => Line::Help,
        "tools" => Line::Tools,
        operation => Line::Invoke {
            operation: operation.to_string(),
            arguments: if rest.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(rest)?
            },
        },
    })
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or the terminal fails.
pub async fn run(backend: &Backend) -> Result<(), CliError> {
    let dispatcher = dispatcher(backend.connect()?)?;
    let session = new_session()?;
    let terminal = Terminal::new();
    let gate = TerminalGate::new(terminal.clone());

    println!("{HELP}");
    while let Some(line) = terminal.read_line("webmcp> ").await? {
        match parse_line(&line) {
            Ok(Line::Empty) => {}
            Ok(Line::Quit) => break,
            Ok(Line::Help) => println!("{HELP}"),
            Ok(Line::Tools) => {
                for name in dispatcher.registry().names() {
                    println!("  {name}");
                }
            }
            Ok(Line::Invoke {
                operation,
                arguments,
            }) => {
                let request = InvocationRequest::new(operation, arguments);
                let result = dispatcher.invoke(&request, &session, &gate).await;
                super::invoke::print_result(&result, false)?;
            }
            Err(e) => eprintln!("arguments must be JSON: {e}"),
        }
    }
    Ok(())
}
