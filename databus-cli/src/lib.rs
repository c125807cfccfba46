//! Command-line interface for moving graphs between a Databus, SPARQL graph
//! stores and local files.
#![forbid(unsafe_code)]

use std::future::Future;
use std::io::Write;

use clap::{Parser, Subcommand};
use databus_data::http::HttpConfig;
use reqwest::Client;

mod catalog;
mod error;
mod load;
mod publish;
mod random;

pub use error::CliError;

use catalog::{CompleteArgs, FacetsArgs, SearchArgs};
use load::LoadArgs;
use publish::PublishArgs;
use random::RandomValuesArgs;

const ARG_CHUNK_SIZE: &str = "chunk-size";
const ARG_GRAPH: &str = "graph";
const ARG_GRAPH_ENDPOINT: &str = "graph-endpoint";
const ARG_DATABUS: &str = "databus";

/// Run the Databus CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Load(args) => load::run_load(args, writer),
        Command::Publish(args) => publish::run_publish(args, writer),
        Command::RandomValues(args) => random::run_random_values(args, writer),
        Command::Complete(args) => catalog::run_complete(args, writer),
        Command::Facets(args) => catalog::run_facets(args, writer),
        Command::Search(args) => catalog::run_search(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "databus",
    about = "Load, publish and look up files on a DBpedia Databus",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy a Databus file into a graph store or a local file.
    Load(LoadArgs),
    /// Publish a graph as a new version of a Databus artifact.
    Publish(PublishArgs),
    /// Print a table of random tokens as JSON.
    RandomValues(RandomValuesArgs),
    /// Suggest completions for a partial Databus identifier.
    Complete(CompleteArgs),
    /// List the formats or versions published for an artifact.
    Facets(FacetsArgs),
    /// Full-text search over a Databus.
    Search(SearchArgs),
}

/// Drive `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

fn http_client(follow_redirects: bool) -> Result<Client, CliError> {
    Ok(HttpConfig::default()
        .with_redirects(follow_redirects)
        .build()?)
}

fn write_lines<I>(writer: &mut dyn Write, lines: I) -> Result<(), CliError>
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    for line in lines {
        writeln!(writer, "{line}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
