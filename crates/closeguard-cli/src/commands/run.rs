use anyhow::{Context, Result};
use closeguard_core::{CloseConfirmation, ClosePolicy};
use closeguard_host::scenario::WindowSummary;
use closeguard_host::{Report, Scenario, run_scenario};
use std::path::Path;

/// Command-line settings that take precedence over the scenario's own
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Value of `--close-confirmation`; `Some("")` when given bare
    pub close_confirmation: Option<String>,
    pub skip_close_warnings: bool,
    pub browser_outlives_windows: bool,
}

/// Load a scenario, apply `overrides` and play it
pub fn run_scenario_file(file: &Path, overrides: &Overrides) -> Result<Report> {
    tracing::debug!("Reading scenario file: {}", file.display());

    let mut scenario = Scenario::from_file(file)
        .with_context(|| format!("Failed to load scenario {}", file.display()))?;

    if let Some(value) = overrides.close_confirmation.as_deref() {
        scenario.settings.close_confirmation = CloseConfirmation::from_switch(Some(value));
    }
    if overrides.skip_close_warnings {
        scenario.settings.skip_close_warnings = true;
    }
    if overrides.browser_outlives_windows {
        scenario.settings.browser_outlives_windows = true;
    }
    tracing::debug!("Effective settings: {:?}", scenario.settings);

    Ok(run_scenario(&scenario)?)
}

pub fn execute(file: &Path, overrides: &Overrides, format: &str) -> Result<()> {
    tracing::info!("Running close scenario: {}", file.display());

    let report = run_scenario_file(file, overrides)?;

    match format {
        "json" => output_json(&report)?,
        _ => output_pretty(&report)?,
    }

    Ok(())
}

fn output_pretty(report: &Report) -> Result<()> {
    use console::style;

    println!("\n{}", style("Close Scenario Report").bold().cyan());
    println!("{}", style("=====================").cyan());

    println!("\n{}", style("Events:").bold());
    for (index, event) in report.events.iter().enumerate() {
        let line = format!("{:>3}. {}", index + 1, event);
        if event.is_prompt() {
            println!("  {}", style(line).yellow());
        } else {
            println!("  {}", line);
        }
    }

    println!("\n{}", style("Windows:").bold());
    for window in &report.windows {
        println!("  {:<12} {}", window.name, describe(window));
    }

    println!("\n{}", style("Summary:").bold());
    println!("  Prompts Shown:  {}", report.prompts_shown());
    println!("  Windows Open:   {}", report.open_windows().len());

    println!();
    Ok(())
}

fn describe(window: &WindowSummary) -> String {
    if !window.open {
        return format!("(window {}) closed", window.id);
    }

    let mut text = format!("(window {}) open, {} tab(s)", window.id, window.tabs);
    match window.prompt {
        Some(ClosePolicy::Downloads) => text.push_str(", waiting on the download warning"),
        Some(ClosePolicy::MultipleTabs) => text.push_str(", waiting on the close confirmation"),
        None => {}
    }
    text
}

fn output_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
