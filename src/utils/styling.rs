//! Terminal styling for the analysis console output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SCALES: Emoji<'_, '_> = Emoji("⚖️  ", "");

const CARD_WIDTH: usize = 60;

/// Settings shown on the configuration card
pub struct ConfigCard<'a> {
    pub ballots: &'a Path,
    pub metadata: Option<&'a Path>,
    pub output_dir: &'a Path,
    pub attributes: &'a [String],
    pub test: &'a str,
    pub degree: usize,
    pub penalty_c: Option<f64>,
}

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ____  _       _         ____  _        _
    / ___|| | __ _| |_ ___  / ___|| |_ __ _| |_ ___
    \___ \| |/ _` | __/ _ \ \___ \| __/ _` | __/ __|
     ___) | | (_| | ||  __/  ___) | || (_| | |_\__ \
    |____/|_|\__,_|\__\___| |____/ \__\__,_|\__|___/
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("σ").magenta().bold(),
        style("Slate voting analysis by chapter").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(card: &ConfigCard) {
    let line = "─".repeat(CARD_WIDTH - 2);
    let inner = CARD_WIDTH - 14;

    println!("    ┌{}┐", line);
    println!("    │ {}", style("⚙️  Configuration").cyan().bold());
    println!("    ├{}┤", line);
    println!(
        "    │  {} Ballots:  {:<width$}",
        FOLDER,
        truncate_path(card.ballots, inner),
        width = inner
    );
    println!(
        "    │  {} Metadata: {:<width$}",
        FOLDER,
        card.metadata
            .map(|p| truncate_path(p, inner))
            .unwrap_or_else(|| "(none)".to_string()),
        width = inner
    );
    println!(
        "    │  {} Output:   {:<width$}",
        SAVE,
        truncate_path(card.output_dir, inner),
        width = inner
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Attributes: {}",
        TARGET,
        style(card.attributes.join(", ")).yellow()
    );
    println!("    │  {} Test:       {}", SCALES, style(card.test).yellow());
    let penalty = match card.penalty_c {
        Some(c) => format!("L2, C = {}", c),
        None => "none".to_string(),
    };
    println!(
        "    │  {} Model:      {}",
        CHART,
        style(format!("degree {}, penalty {}", card.degree, penalty)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a section title inside a step
pub fn print_section(title: &str) {
    println!();
    println!("    {} {}", style("✧").cyan(), style(title).white().bold());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!("    {} {}", WARN, style(message).yellow());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("completed in {:.2?}", elapsed)).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Slate analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

/// Print any table indented to line up with the other console output
pub fn print_indented(block: &str) {
    for line in block.lines() {
        println!("    {}", line);
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of a long string, prefixed with `...`
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let tail: String = chars[chars.len() - keep..].iter().collect();
        format!("...{}", tail)
    }
}
