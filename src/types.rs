use std::borrow::Cow;
use std::path::PathBuf;

// Configuration.

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub verbosity: u8,
    pub editor: EditorConfig,
    pub report: ReportConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Client expression for `evaluate-commands -try-client` when jumping to a location.
    pub jump_client: String,
    /// Client expression for `evaluate-commands -try-client` when showing scratch buffers.
    pub tools_client: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            jump_client: "%opt{jumpclient}".to_string(),
            tools_client: "%opt{toolsclient}".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub display: ReportDisplay,
    /// Filetype of the scratch buffer showing a report.
    pub filetype: String,
    /// When set, reports are also written there as standalone HTML pages.
    pub html_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            display: ReportDisplay::Buffer,
            filetype: "markdown".to_string(),
            html_dir: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportDisplay {
    /// Scratch buffer holding the Markdown source.
    Buffer,
    /// Modal info box rendered with Kakoune markup.
    Info,
}

// Editor.

pub type SessionId = String;
pub type ClientId = String;

#[derive(Clone, Debug, Default)]
pub struct EditorMeta {
    /// Commands go to stdout when there is no session.
    pub session: Option<SessionId>,
    pub client: Option<ClientId>,
}

#[derive(Debug)]
pub struct EditorResponse {
    pub meta: EditorMeta,
    pub command: Cow<'static, str>,
}
