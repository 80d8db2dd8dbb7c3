//! # Coinage Probe
//!
//! Command-line tool to check a currency file against sample amounts.
//!
//! Set `RUST_LOG=debug` to see registry construction details.

use std::process::ExitCode;

use coinage::{CoinageConfig, DisplayStyle, Registry};
use tracing_subscriber::prelude::*;

fn print_usage() {
    println!("Usage: coinage_probe <currencies.toml> [options] <amount>...");
    println!();
    println!("Options:");
    println!("  --style <abbr|short|full|alt>  Label style (default: [display] in the file)");
    println!("  --no-separators                Omit \", \" after each part");
}

fn parse_style(name: &str) -> Option<DisplayStyle> {
    match name {
        "abbr" => Some(DisplayStyle::Abbreviation),
        "short" => Some(DisplayStyle::ShortName),
        "full" => Some(DisplayStyle::FullName),
        "alt" => Some(DisplayStyle::Alternate),
        _ => None,
    }
}

fn print_registry(registry: &Registry) {
    println!("┌─ CURRENCIES ───────────────────────────────────────────────────┐");
    for (id, currency) in registry.iter() {
        let labels: Vec<String> = currency
            .denominations()
            .iter()
            .map(|d| format!("{}={}", d.abbreviation, d.multiplier))
            .collect();
        println!("│ {:<4} {:<16} {}", id, currency.name(), labels.join(" "));
    }
    println!("└────────────────────────────────────────────────────────────────┘");

    if !registry.warnings().is_empty() {
        println!();
        println!("┌─ WARNINGS ─────────────────────────────────────────────────────┐");
        for warning in registry.warnings() {
            println!("│  - {warning}");
        }
        println!("└────────────────────────────────────────────────────────────────┘");
    }
    println!();
}

fn probe(registry: &Registry, text: &str, style: DisplayStyle, use_separators: bool) -> bool {
    let Some(money) = registry.parse_money(text) else {
        println!("✗ {text:?}: not an amount in any single currency");
        return false;
    };

    match registry.format_money(&money, style, use_separators) {
        Ok(formatted) => {
            println!(
                "✓ {:?} -> {} in '{}' -> \"{}\" ({})",
                text,
                money.value,
                registry.get_by_id(money.currency).name(),
                formatted.text,
                formatted.color
            );
            true
        }
        Err(e) => {
            println!("✗ {text:?}: {e}");
            false
        }
    }
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(config_path) = args.first() else {
        print_usage();
        return ExitCode::from(2);
    };

    let mut style = None;
    let mut use_separators = None;
    let mut amounts = Vec::new();

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--style" => {
                let Some(parsed) = rest.next().and_then(|s| parse_style(s)) else {
                    println!("Error: --style expects one of abbr, short, full, alt");
                    return ExitCode::from(2);
                };
                style = Some(parsed);
            }
            "--no-separators" => use_separators = Some(false),
            _ => amounts.push(arg.as_str()),
        }
    }

    let config = match CoinageConfig::from_toml_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Error: Could not load {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let style = style.unwrap_or(config.display.style);
    let use_separators = use_separators.unwrap_or(config.display.separators);
    let registry = config.build_registry();
    print_registry(&registry);

    let failures = amounts
        .iter()
        .filter(|text| !probe(&registry, text, style, use_separators))
        .count();

    println!();
    if failures == 0 {
        println!("✓ {} amounts recognised", amounts.len());
    } else {
        println!("⚠ {} of {} amounts not recognised", failures, amounts.len());
    }
    ExitCode::SUCCESS
}
