use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqldep::{analyze_directory, report, scanner, AnalyzeOptions};

#[derive(Parser)]
#[command(name = "sqldep")]
#[command(author, version, about = "Execution-order dependency analysis for SQL job files")]
struct Cli {
    /// Directory containing the SQL files
    #[arg(short = 't', long, default_value = ".", global = true)]
    target_dir: PathBuf,

    /// Filename pattern, matched case-insensitively
    #[arg(short = 's', long, default_value = "*.sql", global = true)]
    search_pattern: String,

    /// Scan subdirectories too
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Encoding tried when a file is not valid UTF-8
    #[arg(short, long, default_value = "gbk", global = true)]
    encoding: String,

    /// Show processing logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dependency forest (the default)
    Show {
        /// File of confirmed-missing tables, one per line; trees that
        /// depend on them are hidden
        #[arg(short, long)]
        block_incomplete: Option<PathBuf>,

        /// Render breadth-first layers instead of the waterfall tree
        #[arg(short, long)]
        layers: bool,

        /// Show only one tree, by the index printed by `roots`
        #[arg(long)]
        root: Option<usize>,
    },
    /// List the files that should be executed last
    Roots,
    /// List the files that can safely be executed first
    Bases,
    /// List tables that are read but created by no scanned file
    Missing,
    /// Show creates/uses/missing of one analyzed file
    Info {
        /// Filename as printed in the forest
        file: String,
    },
    /// Find which files create a table
    Find {
        /// Table name, without schema qualifier
        table: String,
    },
    /// Generate drop statements: drop-all, drop-mid, or a filename
    Gen {
        target: String,
    },
    /// List incomplete files whose direct dependencies are all complete
    Bottlenecks {
        /// File of confirmed-missing tables, one per line
        #[arg(short, long)]
        block_incomplete: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = AnalyzeOptions {
        dir: cli.target_dir,
        pattern: cli.search_pattern,
        recursive: cli.recursive,
        fallback_encoding: cli.encoding,
    };
    let mut graph = analyze_directory(&options)?;

    let command = cli.command.unwrap_or(Commands::Show {
        block_incomplete: None,
        layers: false,
        root: None,
    });

    match command {
        Commands::Show {
            block_incomplete,
            layers,
            root,
        } => {
            if let Some(list_path) = &block_incomplete {
                let confirmed = scanner::read_missing_list(list_path)?;
                graph.mark_incomplete(&confirmed);
            }
            if let Some(index) = root {
                print!("{}", report::render_tree_by_root_index(&graph, index)?);
            } else if layers {
                for &id in graph.root_ids() {
                    if block_incomplete.is_some() && !graph.unit(id).complete {
                        continue;
                    }
                    print!("{}", report::render_layers(&graph, id));
                }
            } else {
                print!(
                    "{}",
                    report::render_forest(&graph, block_incomplete.is_some())
                );
            }
        }
        Commands::Roots => print!("{}", report::render_roots(&graph)),
        Commands::Bases => print!("{}", report::render_bases(&graph)),
        Commands::Missing => print!("{}", report::render_missing(&graph)),
        Commands::Info { file } => print!("{}", report::render_unit_detail(&graph, &file)?),
        Commands::Find { table } => print!("{}", report::render_find(&graph, &table)),
        Commands::Gen { target } => print!("{}", report::render_drops(&graph, &target)?),
        Commands::Bottlenecks { block_incomplete } => {
            let confirmed = scanner::read_missing_list(&block_incomplete)?;
            graph.mark_incomplete(&confirmed);
            print!("{}", report::render_bottlenecks(&graph));
        }
    }

    Ok(())
}
