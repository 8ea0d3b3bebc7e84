use crate::doctor::run_doctor;
use crate::error::ClientCommandError;
use crate::window::ClientWindow;
use lsp_types::Location;
use serde::Deserialize;
use serde_json::Value;

pub const STACKTRACE_TITLE: &str = "Stacktrace";

/// Commands Metals asks the client to run through `metals/executeClientCommand`.
#[derive(Debug, PartialEq, Eq)]
pub enum ClientCommand {
    GotoLocation,
    ShowStacktrace,
    DoctorRun,
    /// Metals sends the refreshed report to an already open doctor.
    DoctorReload,
    Unknown(String),
}

impl ClientCommand {
    pub fn from_name(name: &str) -> Self {
        match name {
            "metals-goto-location" => ClientCommand::GotoLocation,
            "metals-show-stacktrace" => ClientCommand::ShowStacktrace,
            "metals-doctor-run" => ClientCommand::DoctorRun,
            "metals-doctor-reload" => ClientCommand::DoctorReload,
            _ => ClientCommand::Unknown(name.to_string()),
        }
    }
}

/// Handle `metals/executeClientCommand`.
///
/// Params that are not an object are ignored. Otherwise `command` and `arguments` are read
/// loosely: a `command` that is not a string is named by its JSON text and is unknown, and
/// `arguments` that are not a list count as no arguments.
pub fn execute_client_command<W: ClientWindow>(
    params: Value,
    window: &mut W,
) -> Result<(), ClientCommandError> {
    let params = match params {
        Value::Object(params) => params,
        params => {
            warn!("Ignoring executeClientCommand with params {}", params);
            return Ok(());
        }
    };
    let name = match params.get("command") {
        Some(Value::String(name)) => name.clone(),
        Some(command) => command.to_string(),
        None => Value::Null.to_string(),
    };
    let arguments: &[Value] = match params.get("arguments") {
        Some(Value::Array(arguments)) => arguments,
        _ => &[],
    };
    debug!("Client command: {}", name);
    match ClientCommand::from_name(&name) {
        ClientCommand::GotoLocation => goto_location(arguments, window),
        ClientCommand::ShowStacktrace => show_stacktrace(arguments, window),
        ClientCommand::DoctorRun | ClientCommand::DoctorReload => {
            return doctor(arguments, window)
        }
        ClientCommand::Unknown(name) => {
            window.report_status(&format!("Unknown command {}", name));
        }
    }
    Ok(())
}

fn goto_location<W: ClientWindow>(arguments: &[Value], window: &mut W) {
    let Some(argument) = arguments.first() else {
        return;
    };
    match Location::deserialize(argument) {
        Ok(location) => window.navigate_to(&location),
        Err(e) => warn!("Invalid location {}: {}", argument, e),
    }
}

fn show_stacktrace<W: ClientWindow>(arguments: &[Value], window: &mut W) {
    match arguments.first() {
        None => (),
        Some(Value::String(html)) => window.show_text(STACKTRACE_TITLE, html),
        Some(argument) => warn!("Stacktrace is not a string: {}", argument),
    }
}

fn doctor<W: ClientWindow>(
    arguments: &[Value],
    window: &mut W,
) -> Result<(), ClientCommandError> {
    match arguments.first() {
        None => Ok(()),
        Some(Value::String(json)) => run_doctor(json, window),
        Some(argument) => {
            warn!("Doctor report is not a JSON string: {}", argument);
            Ok(())
        }
    }
}
