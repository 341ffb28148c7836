use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use log::{error, info};

use kubernetriks_simspec::config::SimSpecToolConfig;
use kubernetriks_simspec::report::printer::{print_spec, OutputFormat};
use kubernetriks_simspec::{Pod, SIM_SPEC_ANNOTATION};

/// Validates the simSpec annotation of a pod manifest and prints its phases.
#[derive(Parser)]
struct Args {
    #[clap(short, long)]
    pod_file: PathBuf,
    #[clap(short, long)]
    config_file: Option<PathBuf>,
    /// Overrides the format from the config file
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,
}

fn init_logger(config: &SimSpecToolConfig) {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    if let Some(logs_filepath) = &config.logs_filepath {
        let log_file = FileRotate::new(
            logs_filepath,
            AppendCount::new(3),
            ContentLimit::Bytes(config.logs_max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        env_logger_builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    env_logger_builder.init();
}

fn read_config(config_file: &Option<PathBuf>) -> Result<SimSpecToolConfig> {
    let Some(path) = config_file else {
        return Ok(Default::default());
    };
    let config_yaml = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {:?}", path))?;
    serde_yaml::from_str(&config_yaml)
        .with_context(|| format!("could not parse config file {:?}", path))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = read_config(&args.config_file)?;
    init_logger(&config);

    info!("Path to pod file: {:?}", args.pod_file);

    let pod_yaml = std::fs::read_to_string(&args.pod_file)
        .with_context(|| format!("could not read pod file {:?}", args.pod_file))?;
    let pod: Pod = serde_yaml::from_str(&pod_yaml)
        .with_context(|| format!("could not parse pod manifest {:?}", args.pod_file))?;

    let spec = match pod.sim_spec() {
        Ok(spec) => spec,
        Err(err) => {
            error!(
                "Pod {:?} has unusable {} annotation ({:?}): {}",
                pod.metadata.name,
                SIM_SPEC_ANNOTATION,
                err.kind(),
                err
            );
            return Err(err.into());
        }
    };
    info!(
        "Pod {:?}: {} phases, {} seconds total",
        pod.metadata.name,
        spec.len(),
        spec.total_seconds()
    );

    let format = args.format.unwrap_or(config.printer.format);
    let mut out: Box<dyn Write> = match &config.printer.output_file {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("could not create {:?}", path))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    print_spec(&spec, format, &mut out).context("could not print spec")?;
    out.flush()?;

    Ok(())
}
