//! # Rendering
//!
//! Plain functions from list state to strings; the commands print them.
//!
//! ```text
//! Metadata (meta)
//! Expected: Stain [stain], Lens [lens]
//!   magnification  40
//!   stain          H&E
//!   tiles          {
//!                      "w": 256
//!                  }
//! ```
//!
//! Keys are padded by display width (`unicode-width`), so wide characters keep the
//! value column aligned. Block values continue under the value column.

use metaeditapp::list::ListHeader;
use metaeditapp::rows::{Row, RowState};
use unicode_width::UnicodeWidthStr;

use super::styles;

const INDENT: &str = "  ";
const GUTTER: &str = "  ";
const MAX_KEY_WIDTH: usize = 32;

pub fn list_view(header: &ListHeader, rows: &[Row]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        styles::TITLE.apply_to(&header.title),
        styles::MUTED.apply_to(format!("({})", header.field_name))
    ));

    if !header.hints.is_empty() {
        let hints: Vec<String> = header
            .hints
            .iter()
            .map(|hint| {
                if hint.label() == hint.value {
                    hint.value.clone()
                } else {
                    format!("{} [{}]", hint.label(), hint.value)
                }
            })
            .collect();
        out.push_str(&format!(
            "{} {}\n",
            styles::HINT.apply_to("Expected:"),
            hints.join(", ")
        ));
    }

    if rows.is_empty() {
        out.push_str(&format!("{}{}\n", INDENT, styles::MUTED.apply_to("(no metadata)")));
        return out;
    }

    let key_width = rows
        .iter()
        .map(|row| row.key().width())
        .max()
        .unwrap_or(0)
        .min(MAX_KEY_WIDTH);
    let continuation = " ".repeat(INDENT.len() + key_width + GUTTER.len());

    for row in rows {
        let value = match row.state() {
            RowState::Viewing(display) => display.display_value().to_string(),
            RowState::Editing(edit) => edit.text().to_string(),
        };
        let key = row.key();
        let padding = " ".repeat(key_width.saturating_sub(key.width()));
        let mut lines = value.lines();
        let first = lines.next().unwrap_or("");
        out.push_str(&format!(
            "{}{}{}{}{}\n",
            INDENT,
            styles::KEY.apply_to(key),
            padding,
            GUTTER,
            first
        ));
        for line in lines {
            out.push_str(&continuation);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
