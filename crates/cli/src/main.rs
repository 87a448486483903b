#![allow(clippy::print_stdout)]

use std::cell::Cell;
use std::path::PathBuf;

use anyhow::{Context, Result};
use callweave_core::{Profile, import_evented, parse_trace};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: callweave <trace.json> [--json]");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let as_json = args.iter().any(|arg| arg == "--json");

    let data =
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let trace = parse_trace(&data).context("failed to parse trace")?;
    let profile = import_evented(&trace).context("failed to import trace")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    print_summary(&profile);
    print_tree(&profile);
    Ok(())
}

fn print_summary(profile: &Profile) {
    println!("{} ({})", profile.name, profile.unit);
    println!(
        "  duration: {} ({} .. {})",
        profile.duration(),
        profile.started_at,
        profile.ended_at
    );
    println!("  nodes: {}", profile.call_tree().len());
    if let Some(min) = profile.min_frame_duration {
        println!("  min frame duration: {min}");
    }
    println!();
}

fn print_tree(profile: &Profile) {
    // for_each takes two closures, so the depth counter lives in a Cell.
    let depth = Cell::new(0usize);
    profile.for_each(
        |node| {
            let name = profile
                .frame(node.frame)
                .map(|frame| frame.name.as_str())
                .unwrap_or("<unknown frame>");
            let marker = if node.is_recursive() { " (recursive)" } else { "" };
            println!(
                "{pad}{name}  total {total}  self {self_weight}{marker}",
                pad = "  ".repeat(depth.get()),
                total = node.total_weight,
                self_weight = node.self_weight,
            );
            depth.set(depth.get() + 1);
        },
        |_| depth.set(depth.get().saturating_sub(1)),
    );
}
