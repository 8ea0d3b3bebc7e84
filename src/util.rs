/// Escape Kakoune string wrapped into single quote
pub fn editor_escape(s: &str) -> String {
    s.replace('\'', "''")
}

/// Convert to Kakoune string by wrapping into quotes and escaping
pub fn editor_quote(s: &str) -> String {
    format!("'{}'", editor_escape(s))
}

/// File name for a report titled `title`, e.g. "Metals Doctor" -> "metals-doctor".
pub fn slug(title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote() {
        assert_eq!(editor_quote("it's"), "'it''s'");
        assert_eq!(editor_quote(""), "''");
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Metals Doctor"), "metals-doctor");
        assert_eq!(slug("  Build/Targets! "), "build-targets");
        assert_eq!(slug("***"), "report");
    }
}
