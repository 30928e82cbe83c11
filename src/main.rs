use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::{Path, PathBuf};

use topogen::config::{Config, DragonflyConfig, PolarflyConfig, TopologyConfig};
use topogen::config_loader;
use topogen::field::GaloisField;
use topogen::orchestrator;

/// Polarfly and Dragonfly topology generator for network simulators
#[derive(Parser, Debug)]
#[command(name = "topogen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Output directory; overrides the config file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every topology listed in a configuration file
    Generate {
        /// Path to the topology configuration YAML file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Build a single Polarfly topology
    Polarfly {
        /// Field order, a prime power up to 128
        #[arg(short, long)]
        q: u32,

        /// Replication parameter (only 0 is implemented)
        #[arg(long, default_value = "0")]
        replication: u32,

        /// Endpoints per router (default: half the maximum degree)
        #[arg(long)]
        hosts_per_router: Option<u32>,

        /// Skip routing table construction (required above q = 63)
        #[arg(long)]
        no_routing: bool,
    },

    /// Build a single Dragonfly topology
    Dragonfly {
        /// Inter-router degree d; 2(d+1)/3 must be an even integer
        #[arg(short, long)]
        degree: u32,

        /// Expected router count, checked against the derived shape
        #[arg(long)]
        routers: Option<usize>,

        /// Endpoints per router (default: global links per router)
        #[arg(long)]
        hosts_per_router: Option<u32>,

        /// Skip routing table construction (required above d = 26)
        #[arg(long)]
        no_routing: bool,
    },

    /// Print a summary of GF(q)
    Field {
        /// Field order, a prime power up to 256
        #[arg(short, long)]
        q: u32,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // A generate run may take its log level from the config file, so it is
    // loaded before the logger exists
    let config = match &cli.command {
        Commands::Generate { config } => Some(config_loader::load_config(config)?),
        _ => None,
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.general().log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(&log_level)).init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Generate { config: path } => {
            info!("Configuration file: {:?}", path);
            let config = match config {
                Some(config) => config,
                None => config_loader::load_config(&path)?,
            };
            run(&config, cli.output.as_deref())
        }
        Commands::Polarfly { q, replication, hosts_per_router, no_routing } => {
            let topology = TopologyConfig::Polarfly(PolarflyConfig {
                q,
                replication,
                hosts_per_router,
                routing: !no_routing,
            });
            run(&config_loader::config_from_cli(topology, None)?, cli.output.as_deref())
        }
        Commands::Dragonfly { degree, routers, hosts_per_router, no_routing } => {
            let topology = TopologyConfig::Dragonfly(DragonflyConfig {
                degree,
                routers,
                hosts_per_router,
                routing: !no_routing,
            });
            run(&config_loader::config_from_cli(topology, None)?, cli.output.as_deref())
        }
        Commands::Field { q } => print_field(q),
    }
}

fn run(config: &Config, output_override: Option<&Path>) -> Result<()> {
    let output_dir = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config.general().output_dir()));
    info!("Output directory: {:?}", output_dir);

    let topologies = config.resolved_topologies()?;
    let built = orchestrator::build_batch(&topologies)?;

    if config.general().should_validate() {
        for topology in &built {
            orchestrator::validate_built(topology)?;
        }
    } else {
        warn!("Skipping post-construction validation");
    }

    for topology in &built {
        orchestrator::write_outputs(topology, &output_dir)?;
    }

    info!("Generated {} topologies in {:?}", built.len(), output_dir);
    Ok(())
}

fn print_field(q: u32) -> Result<()> {
    let field = GaloisField::new(q)?;
    println!("GF({})", field.order());
    println!("  characteristic:       {}", field.characteristic());
    println!("  extension degree:     {}", field.degree());
    println!("  reducing polynomial:  {}", field.modulus());
    println!("  primitive element:    {}", field.primitive_elem()?);
    Ok(())
}
