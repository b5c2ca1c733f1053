//! corinfo - hardware snapshot CLI
//!
//! Prints CPU vendor, brand, extension flags, clock speed, core count and
//! physical memory for the current machine.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use corinfo::{Collector, Missing, Report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, OutputFormat};

/// corinfo - Point-in-time hardware snapshot
#[derive(Parser, Debug)]
#[command(name = "corinfo")]
#[command(version)]
#[command(about = "Show CPU identity, extension flags, clock, cores and memory")]
struct Cli {
    /// Print JSON (shorthand for --format json)
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Output format (overrides the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Take this many consecutive snapshots
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: Option<u32>,

    /// Write the effective configuration to the config path and exit
    #[arg(long, default_value_t = false)]
    init_config: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn output_format(&self, config: &Config) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format.unwrap_or(config.output.format)
        }
    }

    fn repeat(&self, config: &Config) -> u32 {
        self.repeat.unwrap_or(config.output.repeat).max(1)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    if cli.init_config {
        let path = config.save(cli.config.as_deref())?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let collector = Collector::with_sources(&config.sources);
    let mut reports = Vec::new();
    for _ in 0..cli.repeat(&config) {
        let report = collector
            .collect()
            .context("Failed to collect hardware snapshot")?;
        reports.push(report);
    }

    match cli.output_format(&config) {
        OutputFormat::Json => println!("{}", render_json(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", render_text(report));
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "corinfo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render_json(reports: &[Report]) -> Result<String> {
    let json = match reports {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    };
    json.context("Failed to serialize snapshot to JSON")
}

const HEADING: &str = "HARDWARE SNAPSHOT";

fn render_text(report: &Report) -> String {
    let mut output = report
        .snapshot
        .display()
        .replacen(HEADING, &HEADING.cyan().bold().to_string(), 1);
    for missing in report.status.missing() {
        output.push('\n');
        output.push_str(&format!("{} {}", "note:".yellow().bold(), describe(*missing)));
    }
    output
}

fn describe(missing: Missing) -> &'static str {
    match missing {
        Missing::Frequency => "clock speed not reported by this host",
        Missing::FeatureFlags => "processor does not report extension flags",
        Missing::BrandString => "processor does not report a brand string",
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, render_json, render_text, Cli, HEADING};
    use crate::config::{Config, OutputFormat};
    use clap::Parser;
    use corinfo::{HardwareSnapshot, Missing, Report, Status};

    fn report(status: Status) -> Report {
        let mut snapshot = HardwareSnapshot::zeroed();
        snapshot.vendor_id.copy_from_slice(b"AuthenticAMD");
        snapshot.core_count = 16;
        Report { snapshot, status }
    }

    #[test]
    fn json_flag_selects_json_output() {
        let cli = Cli::try_parse_from(["corinfo", "--json"]).unwrap();
        assert_eq!(cli.output_format(&Config::default()), OutputFormat::Json);
    }

    #[test]
    fn json_flag_conflicts_with_format() {
        let result = Cli::try_parse_from(["corinfo", "--json", "--format", "text"]);
        assert!(result.is_err());
    }

    #[test]
    fn config_format_applies_without_flags() {
        let cli = Cli::try_parse_from(["corinfo"]).unwrap();
        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        assert_eq!(cli.output_format(&config), OutputFormat::Json);
    }

    #[test]
    fn repeat_flag_overrides_config() {
        let cli = Cli::try_parse_from(["corinfo", "--repeat", "3"]).unwrap();
        let mut config = Config::default();
        config.output.repeat = 5;
        assert_eq!(cli.repeat(&config), 3);
    }

    #[test]
    fn repeat_rejects_zero() {
        assert!(Cli::try_parse_from(["corinfo", "--repeat", "0"]).is_err());
    }

    #[test]
    fn single_report_renders_as_object() {
        let json = render_json(&[report(Status::Complete)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["snapshot"]["vendor_id"], "AuthenticAMD");
        assert_eq!(value["status"]["status"], "complete");
    }

    #[test]
    fn repeated_reports_render_as_array() {
        let reports = vec![report(Status::Complete), report(Status::Complete)];
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&reports).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn text_output_lists_missing_pieces() {
        let text = render_text(&report(Status::Partial(vec![Missing::Frequency])));
        assert!(text.contains("Vendor: AuthenticAMD"));
        assert!(text.contains(describe(Missing::Frequency)));
    }

    #[test]
    fn text_output_colors_the_heading() {
        colored::control::set_override(true);
        let text = render_text(&report(Status::Complete));
        colored::control::unset_override();

        let heading = text.lines().find(|l| l.contains(HEADING)).unwrap();
        assert!(heading.contains("\x1b["), "{heading:?}");
    }
}
