//! Terminal styles.
//!
//! Everything that goes to stderr (notifications, prompts) is styled with
//! `for_stderr()` so colors follow stderr's terminal detection, not stdout's.

use console::Style;
use metaeditapp::notify::Severity;
use once_cell::sync::Lazy;

pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static KEY: Lazy<Style> = Lazy::new(|| Style::new().cyan());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static HINT: Lazy<Style> = Lazy::new(|| Style::new().yellow());

static INFO: Lazy<Style> = Lazy::new(|| Style::new().dim().for_stderr());
static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green().for_stderr());
static WARNING: Lazy<Style> = Lazy::new(|| Style::new().yellow().bold().for_stderr());
static DANGER: Lazy<Style> = Lazy::new(|| Style::new().red().bold().for_stderr());
pub static PROMPT: Lazy<Style> = Lazy::new(|| Style::new().bold().for_stderr());

pub fn for_severity(severity: Severity) -> &'static Style {
    match severity {
        Severity::Info => &INFO,
        Severity::Success => &SUCCESS,
        Severity::Warning => &WARNING,
        Severity::Danger => &DANGER,
    }
}
