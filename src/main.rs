use std::{env, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reaction_network::{
    canonize::DEFAULT_ROUNDS,
    config::{Budget, Config, DedupMode, ParallelMode},
    export, loader,
    network::ReactionNetwork,
    reference,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Graph file in the text edge-list format
    path: Option<PathBuf>,

    /// Bundled reference graph to use instead of a file
    #[arg(short, long, conflicts_with = "path")]
    reference: Option<String>,

    /// List the bundled reference graphs and exit
    #[arg(long)]
    list_references: bool,

    /// How species and splits are deduplicated
    #[arg(long, value_enum, default_value_t = DedupMode::Signature)]
    dedup: DedupMode,

    /// Parallelization strategy for per-species work
    #[arg(long, value_enum, default_value_t = ParallelMode::Always)]
    parallel: ParallelMode,

    /// Worker pool size (default: one per core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Signature refinement rounds
    #[arg(long, default_value_t = DEFAULT_ROUNDS)]
    rounds: usize,

    /// Refuse connected components larger than this
    #[arg(long)]
    max_component_size: Option<usize>,

    /// Refuse to produce more species than this
    #[arg(long)]
    max_species: Option<usize>,

    /// Refuse to test more same-composition species pairs than this
    #[arg(long)]
    max_pairs: Option<usize>,

    /// Wall-clock limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Write species.csv, splits.csv, and transformations.csv here
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let time_limit = match self.time_limit {
            Some(secs) => Some(
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("invalid time limit {secs}"))?,
            ),
            None => None,
        };
        let budget = Budget {
            max_component_size: self.max_component_size,
            max_species: self.max_species,
            max_pairs: self.max_pairs,
            time_limit,
        };

        let mut config = Config::default()
            .with_dedup(self.dedup)
            .with_parallel(self.parallel)
            .with_rounds(self.rounds)
            .with_budget(budget);
        if let Some(n) = self.workers {
            if n == 0 {
                bail!("--workers must be at least 1");
            }
            config = config.with_workers(n);
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("REACTION_NETWORK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("reaction_network=info,warn"));

    let format =
        env::var("REACTION_NETWORK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.list_references {
        for name in reference::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let graph = match (&cli.path, &cli.reference) {
        (Some(path), _) => {
            loader::parse(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        (None, Some(name)) => reference::get(name)?,
        (None, None) => bail!("give a graph file or --reference <NAME>"),
    };
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded reference graph"
    );

    let config = cli.config()?;
    let network = ReactionNetwork::build(&graph, &config)?;

    println!("species\t{}", network.species().len());
    println!("splits\t{}", network.splits().len());
    println!("transformations\t{}", network.transformations().len());

    if let Some(dir) = &cli.out_dir {
        export::write_network(dir, &network)
            .with_context(|| format!("failed to write tables to {}", dir.display()))?;
        info!(dir = %dir.display(), "wrote tables");
    }

    Ok(())
}
