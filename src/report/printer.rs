use std::collections::BTreeSet;
use std::io::Write;

use prettytable::{row, Cell, Row, Table};
use serde::{Deserialize, Serialize};

use crate::core::sim_spec::Spec;
use crate::report::summary::SpecSummary;

#[derive(Debug, Default, Deserialize, PartialEq, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    JSON,
    PrettyTable,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct PrinterConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Stdout if not set
    pub output_file: Option<std::path::PathBuf>,
}

pub fn print_spec<W: Write>(
    spec: &Spec,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::PrettyTable => print_spec_as_pretty_table(spec, out),
        OutputFormat::JSON => print_spec_as_json(spec, out),
    }
}

pub fn print_spec_as_pretty_table<W: Write>(spec: &Spec, out: &mut W) -> std::io::Result<()> {
    let resource_names: BTreeSet<&str> = spec
        .iter()
        .flat_map(|phase| phase.resource_usage.keys().map(String::as_str))
        .collect();

    let mut phases_table = Table::new();
    let mut header = Row::new(vec![
        Cell::new("Phase"),
        Cell::new("Start"),
        Cell::new("Seconds"),
    ]);
    for name in resource_names.iter() {
        header.add_cell(Cell::new(name));
    }
    phases_table.add_row(header);

    let mut phase_start = 0u64;
    for (idx, phase) in spec.iter().enumerate() {
        let mut row = Row::new(vec![
            Cell::new(&idx.to_string()),
            Cell::new(&phase_start.to_string()),
            Cell::new(&phase.seconds.to_string()),
        ]);
        for name in resource_names.iter() {
            let usage = phase
                .resource_usage
                .get(*name)
                .map(|quantity| quantity.to_string())
                .unwrap_or_else(|| "-".to_string());
            row.add_cell(Cell::new(&usage));
        }
        phases_table.add_row(row);
        phase_start += u64::from(phase.seconds);
    }

    let summary = SpecSummary::from_spec(spec);
    let mut stats_table = Table::new();
    stats_table.add_row(row!["Resource", "Phases", "Min", "Max", "Mean"]);
    for (name, stats) in summary.resources.iter() {
        stats_table.add_row(row![name, stats.phases, stats.min, stats.max, stats.mean]);
    }

    writeln!(
        out,
        "{} phases, {} seconds total",
        summary.phase_count, summary.total_seconds
    )?;
    phases_table.print(out)?;
    stats_table.print(out)?;
    Ok(())
}

#[derive(Serialize)]
struct SpecJSON<'a> {
    phases: &'a Spec,
    summary: SpecSummary,
}

pub fn print_spec_as_json<W: Write>(spec: &Spec, out: &mut W) -> std::io::Result<()> {
    let document = SpecJSON {
        phases: spec,
        summary: SpecSummary::from_spec(spec),
    };

    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::{print_spec, OutputFormat, PrinterConfig};
    use crate::core::sim_spec::parse_spec_yaml;

    const SPEC: &str = "
    - seconds: 30
      resourceUsage: {cpu: 500m, memory: 256Mi}
    - seconds: 60
      resourceUsage: {cpu: 1, nvidia.com/gpu: 1}
    ";

    #[test]
    fn test_print_json() {
        let spec = parse_spec_yaml(SPEC).unwrap();
        let mut out: Vec<u8> = vec![];
        print_spec(&spec, OutputFormat::JSON, &mut out).unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(30, printed["phases"][0]["seconds"]);
        assert_eq!("500m", printed["phases"][0]["resourceUsage"]["cpu"]);
        assert_eq!("268435456", printed["phases"][0]["resourceUsage"]["memory"]);
        assert_eq!("1", printed["phases"][1]["resourceUsage"]["cpu"]);
        assert_eq!(90, printed["summary"]["total_seconds"]);
        assert_eq!(2, printed["summary"]["resources"]["cpu"]["phases"]);
        assert_eq!(0.75, printed["summary"]["resources"]["cpu"]["mean"]);
    }

    #[test]
    fn test_print_pretty_table() {
        let spec = parse_spec_yaml(SPEC).unwrap();
        let mut out: Vec<u8> = vec![];
        print_spec(&spec, OutputFormat::PrettyTable, &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("2 phases, 90 seconds total"));
        assert!(printed.contains("nvidia.com/gpu"));
        assert!(printed.contains("268435456"));
        assert!(printed.contains("500m"));
        // memory is not declared in the second phase
        assert!(printed.contains(" - "));
    }

    #[test]
    fn test_printer_config_defaults() {
        let config: PrinterConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(PrinterConfig::default(), config);

        let config: PrinterConfig =
            serde_yaml::from_str("format: PrettyTable\noutput_file: spec.txt").unwrap();
        assert_eq!(OutputFormat::PrettyTable, config.format);
        assert_eq!(Some(std::path::PathBuf::from("spec.txt")), config.output_file);
    }
}
