//! Terminal rendering of an [`AnalysisResult`].

use console::Style;
use market_vision_core::{AnalysisResult, MethodAnalysis, Signal};
use std::fmt::Write;

const BAR_WIDTH: usize = 10;

/// Qualitative band for a 1-10 strength score.
pub fn strength_label(strength: u8) -> &'static str {
    match strength {
        8.. => "strong",
        6..=7 => "good",
        4..=5 => "moderate",
        _ => "weak",
    }
}

fn signal_style(signal: Signal) -> Style {
    match signal {
        Signal::Buy => Style::new().green().bold(),
        Signal::Sell => Style::new().red().bold(),
        Signal::Hold => Style::new().yellow().bold(),
    }
}

fn strength_bar(strength: u8) -> String {
    let filled = usize::from(strength.min(BAR_WIDTH as u8));
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Render the full report as a multi-line string.
pub fn format_analysis(analysis: &AnalysisResult) -> String {
    let heading = Style::new().bold().underlined();
    let dim = Style::new().dim();
    let warn = Style::new().yellow();
    let mut out = String::new();

    // writeln! into a String cannot fail.
    let _ = render(analysis, &mut out, &heading, &dim, &warn);
    out
}

fn render(
    analysis: &AnalysisResult,
    out: &mut String,
    heading: &Style,
    dim: &Style,
    warn: &Style,
) -> std::fmt::Result {
    let title = match (&analysis.symbol, &analysis.timeframe) {
        (Some(symbol), Some(timeframe)) => format!("{symbol} · {timeframe}"),
        (Some(symbol), None) => symbol.clone(),
        (None, Some(timeframe)) => timeframe.clone(),
        (None, None) => "Chart analysis".to_string(),
    };
    writeln!(out, "{}", heading.apply_to(title))?;

    if let Some(data) = &analysis.estimated_data {
        writeln!(
            out,
            "{}",
            dim.apply_to(format!(
                "Price {} · {}",
                data.current_price, data.candle_type
            ))
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Signal      {}   Confidence {}%",
        signal_style(analysis.signal).apply_to(analysis.signal),
        analysis.confidence
    )?;

    if let Some(rec) = &analysis.recommendation {
        let levels = [
            ("Entry", &rec.entry_price),
            ("Stop loss", &rec.stop_loss),
            ("Target 1", &rec.take_profit1),
            ("Target 2", &rec.take_profit2),
            ("Risk/reward", &rec.risk_reward_ratio),
        ];
        let present: Vec<_> = levels
            .iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| (label, v)))
            .collect();
        if !present.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", heading.apply_to("Recommendation"))?;
            for (label, value) in present {
                writeln!(out, "  {label:<12}{value}")?;
            }
        }
    }

    if let Some(scenarios) = &analysis.scenarios {
        writeln!(out)?;
        writeln!(out, "{}", heading.apply_to("Scenarios"))?;
        writeln!(
            out,
            "  {} {}",
            Style::new().green().apply_to("▲"),
            scenarios.bullish_condition
        )?;
        writeln!(
            out,
            "  {} {}",
            Style::new().red().apply_to("▼"),
            scenarios.bearish_condition
        )?;
    }

    let methods = analysis.methods();
    if !methods.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", heading.apply_to("Methods"))?;
        for method in methods {
            write_method(out, method, dim)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", heading.apply_to("Technical"))?;
    write_list(out, &analysis.technical, dim, "No technical factors reported")?;

    writeln!(out)?;
    writeln!(out, "{}", heading.apply_to("Fundamental"))?;
    write_list(
        out,
        &analysis.fundamental,
        dim,
        "No fundamental factors inferable from the chart",
    )?;

    writeln!(out)?;
    writeln!(out, "{}", heading.apply_to("Reasoning"))?;
    writeln!(out, "  {}", analysis.reasoning)?;

    if let Some(warnings) = analysis.warnings.as_ref().filter(|w| !w.is_empty()) {
        writeln!(out)?;
        writeln!(out, "{}", warn.apply_to("Warnings"))?;
        for warning in warnings {
            writeln!(out, "  {} {warning}", warn.apply_to("!"))?;
        }
    }

    Ok(())
}

fn write_method(out: &mut String, method: &MethodAnalysis, dim: &Style) -> std::fmt::Result {
    writeln!(
        out,
        "  {:<20} {:<4} {} {}/10 {}",
        method.method,
        signal_style(method.signal).apply_to(method.signal),
        strength_bar(method.strength),
        method.strength,
        dim.apply_to(strength_label(method.strength))
    )?;
    for finding in &method.findings {
        writeln!(out, "      · {finding}")?;
    }
    Ok(())
}

fn write_list(out: &mut String, items: &[String], dim: &Style, empty: &str) -> std::fmt::Result {
    if items.is_empty() {
        writeln!(out, "  {}", dim.apply_to(empty))?;
    }
    for item in items {
        writeln!(out, "  • {item}")?;
    }
    Ok(())
}
