//! One-shot invocation.

use serde_json::Value;
use webmcp_tools::{ConfirmationGate, Dispatcher, InvocationRequest, InvocationResult, StaticGate};

use super::terminal::{Terminal, TerminalGate};
use super::{Backend, CliError, dispatcher, new_session};

/// Invoke `name` with JSON `args` and print the result.
///
/// # Errors
///
/// Returns an error if the arguments are not JSON, the backend cannot be
/// reached, or the invocation fails.
pub async fn run(
    name: &str,
    args: &str,
    backend: &Backend,
    yes: bool,
    json: bool,
) -> Result<(), CliError> {
    let arguments: Value = serde_json::from_str(args)?;
    let dispatcher = dispatcher(backend.connect()?)?;

    let gate: Box<dyn ConfirmationGate> = if yes {
        Box::new(StaticGate::approve())
    } else {
        Box::new(TerminalGate::new(Terminal::new()))
    };

    let result = invoke_once(&dispatcher, name, arguments, gate.as_ref()).await?;
    print_result(&result, json)?;

    match result.error_kind() {
        Some(kind) => Err(CliError::InvocationFailed { kind }),
        None => Ok(()),
    }
}

/// Invoke with a fresh session.
pub(super) async fn invoke_once(
    dispatcher: &Dispatcher,
    name: &str,
    arguments: Value,
    gate: &dyn ConfirmationGate,
) -> Result<InvocationResult, CliError> {
    let session = new_session()?;
    let request = InvocationRequest::new(name, arguments);
    Ok(dispatcher.invoke(&request, &session, gate).await)
}

/// Print a result as text, or as its JSON envelope.
pub(super) fn print_result(result: &InvocationResult, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if let Some(message) = result.error_message() {
        eprintln!("{message}");
    } else {
        println!("{}", result.text());
    }
    Ok(())
}
