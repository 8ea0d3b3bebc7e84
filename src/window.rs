use crate::markup::{html_to_text, markdown_to_html_document, markdown_to_kakoune_markup};
use crate::types::{Config, ReportDisplay};
use crate::util::{editor_quote, slug};
use indoc::formatdoc;
use lsp_types::Location;
use std::fs;
use std::path::Path;

/// Static presentation of a styled report: CSS rules scoped to a wrapper class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportStyle {
    pub wrapper_class: &'static str,
    pub css: &'static str,
}

/// What client commands may do to the editor.
///
/// Every call is fire-and-forget: failures are dealt with by the implementation and never
/// reported back.
pub trait ClientWindow {
    /// Show a short message in the status line.
    fn report_status(&mut self, text: &str);

    /// Jump to `location`.
    fn navigate_to(&mut self, location: &Location);

    /// Show `content`, an HTML fragment, in a new sheet named `title`.
    fn show_text(&mut self, title: &str, content: &str);

    /// Show a Markdown report in a new sheet named `title`.
    fn show_styled_report(&mut self, title: &str, markdown: &str, style: &ReportStyle);
}

/// Collects the Kakoune commands implementing the window calls, in call order.
pub struct KakouneWindow<'a> {
    config: &'a Config,
    commands: Vec<String>,
}

impl<'a> KakouneWindow<'a> {
    pub fn new(config: &'a Config) -> Self {
        KakouneWindow {
            config,
            commands: Vec::new(),
        }
    }

    /// All commands as a single script, or `None` if no call was made.
    pub fn into_command(self) -> Option<String> {
        if self.commands.is_empty() {
            None
        } else {
            Some(self.commands.join("\n"))
        }
    }

    fn try_client(&mut self, client: &str, command: &str) {
        self.commands.push(format!(
            "evaluate-commands -try-client {} -- {}",
            client,
            editor_quote(command)
        ));
    }

    fn show_scratch(&mut self, title: &str, text: &str, filetype: Option<&str>) {
        let mut command = formatdoc!(
            "edit! -scratch {}
             set-register dquote {}
             execute-keys '%R'",
            editor_quote(&format!("*{}*", title)),
            editor_quote(text),
        );
        if let Some(filetype) = filetype {
            command.push_str("\nset-option buffer filetype ");
            command.push_str(&editor_quote(filetype));
        }
        command.push_str("\nexecute-keys gg");
        let config = self.config;
        self.try_client(&config.editor.tools_client, &command);
    }

    fn write_html(&mut self, dir: &Path, title: &str, markdown: &str, style: &ReportStyle) {
        let path = dir.join(format!("{}.html", slug(title)));
        let document = markdown_to_html_document(title, markdown, style.css, style.wrapper_class);
        match fs::create_dir_all(dir).and_then(|_| fs::write(&path, document)) {
            Ok(()) => {
                info!("Wrote {} to {}", title, path.display());
                self.report_status(&format!("{} written to {}", title, path.display()));
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                self.report_status(&format!("Failed to write {}: {}", path.display(), e));
            }
        }
    }
}

impl ClientWindow for KakouneWindow<'_> {
    fn report_status(&mut self, text: &str) {
        self.commands.push(format!("echo -- {}", editor_quote(text)));
    }

    fn navigate_to(&mut self, location: &Location) {
        let path = match location.uri.to_file_path() {
            Ok(path) => path,
            Err(()) => {
                warn!("Not a file location: {}", location.uri);
                self.report_status(&format!("Cannot open {}", location.uri));
                return;
            }
        };
        // Kakoune positions are 1-based.
        let command = format!(
            "edit -existing {} {} {}",
            editor_quote(&path.to_string_lossy()),
            location.range.start.line + 1,
            location.range.start.character + 1,
        );
        let config = self.config;
        self.try_client(&config.editor.jump_client, &command);
    }

    fn show_text(&mut self, title: &str, content: &str) {
        self.show_scratch(title, &html_to_text(content), None);
    }

    fn show_styled_report(&mut self, title: &str, markdown: &str, style: &ReportStyle) {
        let config = self.config;
        match config.report.display {
            ReportDisplay::Buffer => {
                self.show_scratch(title, markdown, Some(&config.report.filetype));
            }
            ReportDisplay::Info => {
                let command = format!(
                    "info -markup -style modal -title {} -- {}",
                    editor_quote(title),
                    editor_quote(&markdown_to_kakoune_markup(markdown)),
                );
                self.try_client(&config.editor.tools_client, &command);
            }
        }
        if let Some(dir) = &config.report.html_dir {
            self.write_html(dir, title, markdown, style);
        }
    }
}

/// Window call log for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingWindow {
    pub calls: Vec<WindowCall>,
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub enum WindowCall {
    Status(String),
    Navigate(Location),
    Text {
        title: String,
        content: String,
    },
    StyledReport {
        title: String,
        markdown: String,
        style: ReportStyle,
    },
}

#[cfg(test)]
impl ClientWindow for RecordingWindow {
    fn report_status(&mut self, text: &str) {
        self.calls.push(WindowCall::Status(text.to_string()));
    }

    fn navigate_to(&mut self, location: &Location) {
        self.calls.push(WindowCall::Navigate(location.clone()));
    }

    fn show_text(&mut self, title: &str, content: &str) {
        self.calls.push(WindowCall::Text {
            title: title.to_string(),
            content: content.to_string(),
        });
    }

    fn show_styled_report(&mut self, title: &str, markdown: &str, style: &ReportStyle) {
        self.calls.push(WindowCall::StyledReport {
            title: title.to_string(),
            markdown: markdown.to_string(),
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use lsp_types::{Position, Range, Url};

    const STYLE: ReportStyle = ReportStyle {
        wrapper_class: "report",
        css: ".report { padding: 1rem }",
    };

    fn location(uri: &str, line: u32, character: u32) -> Location {
        Location {
            uri: Url::parse(uri).unwrap(),
            range: Range {
                start: Position { line, character },
                end: Position { line, character },
            },
        }
    }

    #[test]
    fn nothing_to_send() {
        let config = Config::default();
        assert_eq!(KakouneWindow::new(&config).into_command(), None);
    }

    #[test]
    fn status_is_quoted() {
        let config = Config::default();
        let mut window = KakouneWindow::new(&config);
        window.report_status("Unknown command 'x'");
        assert_eq!(
            window.into_command().unwrap(),
            "echo -- 'Unknown command ''x'''"
        );
    }

    #[test]
    fn navigate_to_file() {
        let config = Config::default();
        let mut window = KakouneWindow::new(&config);
        window.navigate_to(&location("file:///src/Main.scala", 9, 4));
        assert_eq!(
            window.into_command().unwrap(),
            "evaluate-commands -try-client %opt{jumpclient} -- 'edit -existing ''/src/Main.scala'' 10 5'"
        );
    }

    #[test]
    fn navigate_to_non_file_uri() {
        let config = Config::default();
        let mut window = KakouneWindow::new(&config);
        window.navigate_to(&location("jar:file:///lib.jar!/a/B.scala", 0, 0));
        assert_eq!(
            window.into_command().unwrap(),
            "echo -- 'Cannot open jar:file:///lib.jar!/a/B.scala'"
        );
    }

    #[test]
    fn text_goes_to_scratch_buffer() {
        let config = Config::default();
        let mut window = KakouneWindow::new(&config);
        window.show_text("Stacktrace", "<p>boom<br>at A.scala:1</p>");
        assert_eq!(
            window.into_command().unwrap(),
            indoc!(
                "evaluate-commands -try-client %opt{toolsclient} -- 'edit! -scratch ''*Stacktrace*''
                 set-register dquote ''boom
                 at A.scala:1''
                 execute-keys ''%R''
                 execute-keys gg'"
            )
        );
    }

    #[test]
    fn report_in_buffer() {
        let config = Config::default();
        let mut window = KakouneWindow::new(&config);
        window.show_styled_report("Doctor", "# T\n", &STYLE);
        assert_eq!(
            window.into_command().unwrap(),
            indoc!(
                "evaluate-commands -try-client %opt{toolsclient} -- 'edit! -scratch ''*Doctor*''
                 set-register dquote ''# T
                 ''
                 execute-keys ''%R''
                 set-option buffer filetype ''markdown''
                 execute-keys gg'"
            )
        );
    }

    #[test]
    fn report_in_info_box() {
        let mut config = Config::default();
        config.report.display = ReportDisplay::Info;
        let mut window = KakouneWindow::new(&config);
        window.show_styled_report("Doctor", "# T\n", &STYLE);
        assert_eq!(
            window.into_command().unwrap(),
            "evaluate-commands -try-client %opt{toolsclient} -- 'info -markup -style modal -title ''Doctor'' -- ''{InfoHeader}# T{InfoDefault}'''"
        );
    }

    #[test]
    fn report_written_as_html() {
        let dir = std::env::temp_dir().join(format!("metals-kak-test-{}", std::process::id()));
        let mut config = Config::default();
        config.report.html_dir = Some(dir.clone());
        let mut window = KakouneWindow::new(&config);
        window.show_styled_report("Metals Doctor", "# T\n", &STYLE);

        let path = dir.join("metals-doctor.html");
        let document = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert!(document.contains("<style>.report { padding: 1rem }</style>"));
        assert!(document.contains("<div class=\"report\">\n<h1>T</h1>\n</div>"));

        let command = window.into_command().unwrap();
        let status = command.lines().last().unwrap();
        assert_eq!(
            status,
            format!("echo -- 'Metals Doctor written to {}'", path.display())
        );
    }
}
