use console::Term;
use metaeditapp::persistence::Confirmation;
use std::io;

use super::styles;

/// Put a confirmation to the user on stderr. Anything but an explicit yes declines,
/// including a non-interactive stdin.
pub fn confirm(confirmation: &Confirmation) -> io::Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!(
        "{} [y/N] ",
        styles::PROMPT.apply_to(confirmation.plain_message())
    ))?;
    let answer = term.read_line()?;
    Ok(accepts(&answer, &confirmation.confirm_label))
}

fn accepts(answer: &str, confirm_label: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes" || answer == confirm_label.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_answers_accept() {
        assert!(accepts("y", "Delete"));
        assert!(accepts(" YES\n", "Delete"));
        assert!(accepts("delete", "Delete"));
        assert!(!accepts("", "Delete"));
        assert!(!accepts("n", "Delete"));
        assert!(!accepts("sure", "Delete"));
    }
}
