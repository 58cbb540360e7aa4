use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use phpdeps::core::{metrics, Analysis, AnalysisOptions, CodebaseAnalyzer};
use phpdeps::formatters::{DotFormatter, GraphFormatter, JsonCompactFormatter, TextFormatter};
use phpdeps::render::{PlantUmlRenderer, RenderDispatcher};

#[derive(Debug, Parser)]
#[command(
    name = "phpdeps",
    version,
    about = "Static class and namespace dependency graphs for PHP"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one `From --> To` line per dependency
    Text(SourceArgs),
    /// Write a Graphviz digraph
    Dot {
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Write compact JSON
    Json {
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Render a PlantUML diagram image
    Uml {
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Keep the intermediate .uml file
        #[arg(long)]
        keep_uml: bool,
        /// PlantUML executable
        #[arg(long, value_name = "BIN", default_value = "plantuml")]
        plantuml: String,
        /// Give up on the renderer after this many seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
    /// Print coupling metrics and dependency cycles
    Metrics(SourceArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Location of your PHP source files
    #[arg(required = true, value_name = "SOURCE")]
    sources: Vec<PathBuf>,

    /// Include dependencies on internal PHP classes like SplFileInfo
    #[arg(long)]
    internals: bool,

    /// Output dependencies between namespaces instead of classes
    #[arg(long)]
    only_namespaces: bool,

    /// Namespace depth when collapsing (0 keeps full namespaces)
    #[arg(long, value_name = "N", default_value_t = 0)]
    depth: usize,

    /// Only keep dependencies originating in this namespace
    #[arg(long, value_name = "NAMESPACE")]
    filter_from: Option<String>,

    /// Drop dependencies whose endpoints match this regex
    #[arg(long, value_name = "REGEX")]
    exclude_regex: Option<String>,

    /// Source file extensions to collect
    #[arg(long = "extension", value_name = "EXT", default_value = "php")]
    extensions: Vec<String>,
}

impl SourceArgs {
    fn options(&self) -> phpdeps::Result<AnalysisOptions> {
        let mut options = AnalysisOptions::new()
            .with_internals(self.internals)
            .only_namespaces(self.only_namespaces)
            .with_depth(self.depth)
            .with_extensions(self.extensions.iter().cloned());
        if let Some(namespace) = &self.filter_from {
            options = options.with_filter_from(namespace);
        }
        if let Some(pattern) = &self.exclude_regex {
            options = options.with_exclude_pattern(pattern)?;
        }
        Ok(options)
    }

    fn analyze(&self) -> Result<Analysis> {
        let options = self.options()?;
        let analysis = CodebaseAnalyzer::new(options).analyze(&self.sources)?;
        if !analysis.is_complete() {
            warn!(
                "{} of {} files could not be parsed and were skipped",
                analysis.failures.len(),
                analysis.files
            );
        }
        Ok(analysis)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let start_time = Instant::now();
    run(cli.command)?;
    info!("Total execution time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Text(sources) => {
            let analysis = sources.analyze()?;
            print!("{}", TextFormatter::new().format(&analysis.graph)?);
        }
        Command::Dot { sources, output } => {
            write_file(RenderDispatcher::to_file(DotFormatter::new()), &sources, &output)?;
        }
        Command::Json { sources, output } => {
            write_file(
                RenderDispatcher::to_file(JsonCompactFormatter::new()),
                &sources,
                &output,
            )?;
        }
        Command::Uml {
            sources,
            output,
            keep_uml,
            plantuml,
            timeout,
        } => {
            let renderer = PlantUmlRenderer::new()
                .with_program(plantuml)
                .with_keep_intermediate(keep_uml)
                .with_timeout(timeout.map(Duration::from_secs));
            write_file(RenderDispatcher::new(renderer), &sources, &output)?;
        }
        Command::Metrics(sources) => {
            let analysis = sources.analyze()?;
            print_metrics(&analysis);
        }
    }
    Ok(())
}

/// Destination checks run before analysis so a bad path never costs a scan.
fn write_file(dispatcher: RenderDispatcher, sources: &SourceArgs, output: &Path) -> Result<()> {
    dispatcher.validate_destination(output)?;
    let analysis = sources.analyze()?;
    dispatcher.render(&analysis.graph, output)?;
    Ok(())
}

fn print_metrics(analysis: &Analysis) {
    let rows = metrics::coupling(&analysis.graph);
    let width = rows
        .iter()
        .map(|row| row.entity.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Entity".len());

    println!("{:<width$}  {:>5}  {:>5}  {:>11}", "Entity", "Ca", "Ce", "Instability");
    for row in &rows {
        println!(
            "{:<width$}  {:>5}  {:>5}  {:>11.2}",
            row.entity.to_string(),
            row.afferent,
            row.efferent,
            row.instability()
        );
    }

    let cycles = analysis.graph.cycles();
    if !cycles.is_empty() {
        println!();
        println!("Cycles:");
        for cycle in cycles {
            let names: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            println!("  {}", names.join(" <-> "));
        }
    }
}
