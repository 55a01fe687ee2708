//! ANSI styling for terminal diagnostics.

use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

/// Terminal styling helpers. Colors can be disabled process-wide for
/// plain-text consumers (tests, editors reading stderr).
pub struct Style;

impl Style {
    pub fn set_enabled(enabled: bool) {
        COLOR_ENABLED.store(enabled, Ordering::Relaxed);
    }

    fn wrap(code: &str, text: &str) -> String {
        if COLOR_ENABLED.load(Ordering::Relaxed) {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    pub fn bold_red(text: &str) -> String {
        Self::wrap("1;31", text)
    }

    pub fn yellow(text: &str) -> String {
        Self::wrap("33", text)
    }

    pub fn blue(text: &str) -> String {
        Self::wrap("34", text)
    }

    pub fn cyan(text: &str) -> String {
        Self::wrap("36", text)
    }

    pub fn red(text: &str) -> String {
        Self::wrap("31", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_style_passes_text_through() {
        Style::set_enabled(false);
        assert_eq!(Style::bold_red("error"), "error");
        Style::set_enabled(true);
        assert!(Style::bold_red("error").contains("error"));
    }
}
