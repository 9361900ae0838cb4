//! Prompt theme and banner for interactive flows.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with the Market Vision palette. Everything renders to
/// stderr so stdout stays clean for analysis output.
pub fn market_vision_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// One-line banner shown before the first-run key prompt.
pub fn print_banner() {
    let cyan = Style::new().for_stderr().cyan().bold();
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!(
        "  {} {}",
        cyan.apply_to(format!("Market Vision v{}", market_vision_core::VERSION)),
        dim.apply_to("AI-assisted forex chart analysis")
    );
    eprintln!();
}
