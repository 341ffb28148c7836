//! Config fields definitions for the simspec tool

use serde::Deserialize;

use crate::report::printer::PrinterConfig;

#[derive(Debug, Deserialize, PartialEq)]
pub struct SimSpecToolConfig {
    /// If not set default output of logs is stderr
    pub logs_filepath: Option<String>,
    /// Rotated log files are kept up to this size, in bytes.
    #[serde(default = "default_logs_max_bytes")]
    pub logs_max_bytes: usize,
    #[serde(default)]
    pub printer: PrinterConfig,
}

fn default_logs_max_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for SimSpecToolConfig {
    fn default() -> Self {
        Self {
            logs_filepath: None,
            logs_max_bytes: default_logs_max_bytes(),
            printer: Default::default(),
        }
    }
}
