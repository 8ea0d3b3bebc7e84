use crate::client_command::execute_client_command;
use crate::error::ClientCommandError;
use crate::window::ClientWindow;
use jsonrpc_core::{Call, Notification, Params, Value};

pub const EXECUTE_CLIENT_COMMAND: &str = "metals/executeClientCommand";

/// Parse a message from the language server, which must be a notification.
pub fn parse_notification(message: &str) -> Result<Notification, String> {
    match serde_json::from_str(message) {
        Ok(Call::Notification(notification)) => Ok(notification),
        Ok(Call::MethodCall(call)) => Err(format!(
            "Expected a notification, got request {} {:?}",
            call.method, call.id
        )),
        Ok(Call::Invalid { id }) => Err(format!("Invalid call from language server: {:?}", id)),
        Err(e) => Err(format!("Failed to parse language server message: {}", e)),
    }
}

pub fn dispatch_server_notification<W: ClientWindow>(
    notification: Notification,
    window: &mut W,
) -> Result<(), ClientCommandError> {
    let method: &str = &notification.method;
    match method {
        EXECUTE_CLIENT_COMMAND => {
            execute_client_command(params_value(notification.params), window)
        }
        _ => {
            warn!("Unsupported method from language server: {}", method);
            Ok(())
        }
    }
}

fn params_value(params: Params) -> Value {
    match params {
        Params::Map(map) => Value::Object(map),
        Params::Array(values) => Value::Array(values),
        Params::None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{RecordingWindow, WindowCall};
    use indoc::indoc;

    fn dispatch(message: &str) -> Vec<WindowCall> {
        let mut window = RecordingWindow::default();
        let notification = parse_notification(message).unwrap();
        dispatch_server_notification(notification, &mut window).unwrap();
        window.calls
    }

    #[test]
    fn execute_client_command_notification() {
        let calls = dispatch(indoc!(
            r#"{
                "jsonrpc": "2.0",
                "method": "metals/executeClientCommand",
                "params": {"command": "metals-new-scala-file", "arguments": []}
            }"#
        ));
        assert_eq!(
            calls,
            vec![WindowCall::Status(
                "Unknown command metals-new-scala-file".to_string()
            )]
        );
    }

    #[test]
    fn other_methods_are_ignored() {
        let calls = dispatch(
            r#"{"jsonrpc": "2.0", "method": "metals/status", "params": {"text": "ok"}}"#,
        );
        assert!(calls.is_empty());
    }

    #[test]
    fn notification_without_params() {
        let calls = dispatch(r#"{"jsonrpc": "2.0", "method": "metals/executeClientCommand"}"#);
        assert!(calls.is_empty());
    }

    #[test]
    fn requests_are_rejected() {
        let message = r#"{"jsonrpc": "2.0", "id": 1, "method": "metals/quickPick", "params": {}}"#;
        assert!(parse_notification(message).is_err());
        assert!(parse_notification("{").is_err());
    }
}
