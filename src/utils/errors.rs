use nu_ansi_term::Style;

use crate::cli::ColorMode;
use crate::color::{color_mode, ERROR_INDICATOR, ERROR_TEXT, WARNING_INDICATOR, WARNING_TEXT};

pub const DEFAULT_EXIT_CODE: i32 = 1;

fn report(indicator: &str, indicator_style: Style, text: &str, text_style: Style) {
    match color_mode() {
        ColorMode::On => {
            eprintln!("{} {}", indicator_style.paint(indicator), text_style.paint(text));
        }
        ColorMode::Off => {
            eprintln!("{} {}", indicator, text);
        }
    }
}

pub(crate) fn error_internal(text: &str) {
    report("error:", *ERROR_INDICATOR, text, *ERROR_TEXT);
}

pub(crate) fn warn_internal(text: &str) {
    report("warning:", *WARNING_INDICATOR, text, *WARNING_TEXT);
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE);
    })
}
