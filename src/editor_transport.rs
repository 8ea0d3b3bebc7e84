use crate::types::*;
use crate::util::editor_quote;
use std::borrow::Cow;
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Deliver `response` to its Kakoune session, or print it when there is none so that the caller
/// can evaluate it.
pub fn send_command_to_editor(response: EditorResponse) -> Result<(), String> {
    let command = editor_command(&response);
    let session = match &response.meta.session {
        Some(session) => session,
        None => {
            debug!("To stdout: {}", command);
            let mut stdout = io::stdout().lock();
            return writeln!(stdout, "{}", command)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write to stdout: {}", e));
        }
    };

    let mut child = Command::new("kak")
        .args(["-p", session])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to run Kakoune: {}", e))?;

    debug!("To editor `{}`: {}", session, command);
    match child.stdin.as_mut() {
        Some(stdin) => {
            if stdin.write_all(command.as_bytes()).is_err() {
                error!("Failed to write to editor stdin");
            }
        }
        None => return Err("failed to get editor stdin".to_string()),
    }
    // Closes stdin so that kak -p sees the end of the command.
    drop(child.stdin.take());

    let exit_code = child
        .wait()
        .map_err(|e| format!("failed to wait for kak -p: {}", e))?;
    if !exit_code.success() {
        return Err("kak -p exited with non-zero status".to_string());
    }
    Ok(())
}

fn editor_command(response: &EditorResponse) -> Cow<'_, str> {
    match response.meta.client.as_deref().filter(|s| !s.is_empty()) {
        Some(client) => Cow::from(format!(
            "evaluate-commands -client {} -- {}",
            editor_quote(client),
            editor_quote(&response.command)
        )),
        None => Cow::Borrowed(&*response.command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_response(client: Option<&str>, command: &'static str) -> EditorResponse {
        EditorResponse {
            meta: EditorMeta {
                session: None,
                client: client.map(String::from),
            },
            command: Cow::from(command),
        }
    }

    #[test]
    fn command_without_client() {
        let response = editor_response(None, "echo -- 'hi'");
        assert_eq!(editor_command(&response), "echo -- 'hi'");
    }

    #[test]
    fn command_for_client() {
        let response = editor_response(Some("client0"), "echo -- 'hi'");
        assert_eq!(
            editor_command(&response),
            "evaluate-commands -client 'client0' -- 'echo -- ''hi'''"
        );
        let response = editor_response(Some(""), "nop");
        assert_eq!(editor_command(&response), "nop");
    }
}
