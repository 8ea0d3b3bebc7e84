use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

/// Lay out `rows` under `headers` as a monospaced grid.
///
/// Every cell, headers included, is centered within its column, and columns are as wide as their
/// widest cell in terminal columns. Missing trailing cells of a short row are left blank; cells
/// past the last header are dropped. A cell with several lines makes its row as tall as those
/// lines, each centered on its own.
///
/// ```text
/// +-------+------+
/// | Name  | Type |
/// +-------+------+
/// | a-b-c |  ok  |
/// +-------+------+
/// ```
pub fn pretty_table<H, R, C>(headers: &[H], rows: &[R]) -> String
where
    H: AsRef<str>,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let columns = headers.len();

    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            rows.iter()
                .map(|row| cell(row.as_ref(), column))
                .chain(std::iter::once(headers[column].as_ref()))
                .map(text_width)
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = format!(
        "+{}+",
        widths.iter().map(|width| "-".repeat(width + 2)).join("+")
    );
    // One physical line per line of the tallest cell.
    let line = |cells: Vec<&str>| -> String {
        let cells: Vec<Vec<&str>> = cells.into_iter().map(|c| c.lines().collect()).collect();
        let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        (0..height)
            .map(|i| {
                format!(
                    "| {} |",
                    cells
                        .iter()
                        .zip(&widths)
                        .map(|(cell, width)| center(cell.get(i).copied().unwrap_or(""), *width))
                        .join(" | ")
                )
            })
            .join("\n")
    };

    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(border.clone());
    lines.push(line(headers.iter().map(|h| h.as_ref()).collect()));
    lines.push(border.clone());
    for row in rows {
        lines.push(line(
            (0..columns)
                .map(|column| cell(row.as_ref(), column))
                .collect(),
        ));
    }
    lines.push(border);
    lines.join("\n")
}

fn cell<C: AsRef<str>>(row: &[C], column: usize) -> &str {
    row.get(column).map(|c| c.as_ref()).unwrap_or("")
}

fn text_width(text: &str) -> usize {
    text.lines().map(|line| line.width()).max().unwrap_or(0)
}

// Odd padding goes to the right.
fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    let left = padding / 2;
    format!(
        "{}{}{}",
        " ".repeat(left),
        text,
        " ".repeat(padding - left)
    )
}
