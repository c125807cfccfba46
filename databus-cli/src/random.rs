//! `random-values` command: print a table of random tokens as JSON.

use std::io::Write;

use clap::Parser;
use databus_core::generate_random_values;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::CliError;

const DEFAULT_ENTITIES: usize = 10;
const DEFAULT_VALUES: usize = 5;

/// CLI arguments for the `random-values` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print a table of random tokens as JSON")]
#[ortho_config(prefix = "DATABUS")]
pub(crate) struct RandomValuesArgs {
    /// Number of rows (default 10).
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) entities: Option<usize>,
    /// Number of columns per row (default 5).
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) values: Option<usize>,
}

pub(super) fn run_random_values(
    args: RandomValuesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let table = generate_random_values(
        merged.entities.unwrap_or(DEFAULT_ENTITIES),
        merged.values.unwrap_or(DEFAULT_VALUES),
    )?;
    let rendered = serde_json::to_string_pretty(&table).map_err(CliError::SerialiseOutput)?;
    writeln!(writer, "{rendered}").map_err(CliError::WriteOutput)
}
