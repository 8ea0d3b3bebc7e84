use crate::error::ClientCommandError;
use crate::table::pretty_table;
use crate::window::{ClientWindow, ReportStyle};
use serde_json::Value;
use std::fmt::Write as _;

pub const DOCTOR_TITLE: &str = "Metals Doctor";

pub const DOCTOR_STYLE: ReportStyle = ReportStyle {
    wrapper_class: "metals-doctor",
    css: ".metals-doctor { padding: 1.5rem }
.metals-doctor h1 { text-decoration: underline }
.metals-doctor h2, .metals-doctor h3, .metals-doctor p { margin-top: 1rem }",
};

const TARGET_COLUMNS: [&str; 9] = [
    "Build Target",
    "Type",
    "Compilation status",
    "Diagnostics",
    "Interactive",
    "SemanticDB",
    "Debugging",
    "Java Support",
    "Recommendation",
];

/// Build health summary sent by Metals with `metals-doctor-run`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub title: Option<String>,
    pub header: Option<DoctorHeader>,
    pub messages: Option<Vec<DoctorMessage>>,
    pub targets: Option<Vec<DoctorTarget>>,
    pub explanations: Option<Vec<DoctorExplanation>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorHeader {
    pub build_server: Option<String>,
    pub jdk_info: Option<String>,
    pub server_info: Option<String>,
    pub build_target_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorMessage {
    pub title: Option<String>,
    pub recommendations: Option<Vec<String>>,
}

/// One row of the build targets table.
///
/// Metals sends strings, but any JSON value is accepted: strings are shown as sent, `null` and
/// missing fields as empty cells, and other values as their compact JSON text (`true`, `42`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorTarget {
    pub build_target: Option<Value>,
    pub target_type: Option<Value>,
    pub compilation_status: Option<Value>,
    pub diagnostics: Option<Value>,
    pub interactive: Option<Value>,
    pub semanticdb: Option<Value>,
    pub debugging: Option<Value>,
    pub java: Option<Value>,
    pub recommendation: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorExplanation {
    pub title: Option<String>,
    pub explanations: Option<Vec<String>>,
}

impl DoctorTarget {
    fn cells(&self) -> Vec<String> {
        [
            &self.build_target,
            &self.target_type,
            &self.compilation_status,
            &self.diagnostics,
            &self.interactive,
            &self.semanticdb,
            &self.debugging,
            &self.java,
            &self.recommendation,
        ]
        .into_iter()
        .map(|value| cell_text(value.as_ref()))
        .collect()
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
    }
}

/// Parse a doctor report and show it.
///
/// Nothing is shown if `json` is not a valid report.
pub fn run_doctor<W: ClientWindow>(
    json: &str,
    window: &mut W,
) -> Result<(), ClientCommandError> {
    let markdown = render_doctor(json)?;
    debug!("Doctor report:\n{}", markdown);
    window.show_styled_report(DOCTOR_TITLE, &markdown, &DOCTOR_STYLE);
    Ok(())
}

pub fn render_doctor(json: &str) -> Result<String, serde_json::Error> {
    let report: DoctorReport = serde_json::from_str(json)?;
    Ok(doctor_to_markdown(&report))
}

/// Render a report as Markdown, sections in the order of the fields of `DoctorReport`.
pub fn doctor_to_markdown(report: &DoctorReport) -> String {
    let mut markdown = String::new();

    let _ = write!(
        markdown,
        "# {}\n\n",
        report.title.as_deref().unwrap_or_default()
    );

    if let Some(header) = &report.header {
        for paragraph in [
            &header.build_server,
            &header.jdk_info,
            &header.server_info,
            &header.build_target_description,
        ]
        .into_iter()
        .flatten()
        {
            let _ = write!(markdown, "{}\n\n", paragraph);
        }
    }

    for message in report.messages.iter().flatten() {
        let _ = writeln!(
            markdown,
            "### {}",
            message.title.as_deref().unwrap_or_default()
        );
        bullets(&mut markdown, message.recommendations.as_deref());
    }

    if let Some(targets) = report.targets.as_ref().filter(|t| !t.is_empty()) {
        let rows: Vec<Vec<String>> = targets.iter().map(DoctorTarget::cells).collect();
        let _ = write!(
            markdown,
            "## Build Targets\n```\n{}\n```\n\n",
            pretty_table(&TARGET_COLUMNS, &rows)
        );
    }

    for explanation in report.explanations.iter().flatten() {
        let _ = write!(
            markdown,
            "{}\n\n",
            explanation.title.as_deref().unwrap_or_default()
        );
        bullets(&mut markdown, explanation.explanations.as_deref());
    }

    markdown
}

// Bullet list closed by a blank line.
fn bullets(markdown: &mut String, items: Option<&[String]>) {
    for item in items.unwrap_or_default() {
        let _ = writeln!(markdown, "* {}", item);
    }
    markdown.push('\n');
}
