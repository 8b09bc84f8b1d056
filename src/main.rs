use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use hexrealm::cli::commands;
use hexrealm::config::generation::GenerationParams;

#[derive(Parser)]
#[command(name = "hexrealm")]
#[command(about = "Seed-deterministic hex world generator for grand-strategy maps")]
#[command(version)]
struct Cli {
    /// Path to the world generation config file
    #[arg(short, long)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the tile map and countries
    Generate {
        /// Override the configured seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the whole world as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Generate only the countries
    Countries {
        #[arg(short, long)]
        seed: Option<u64>,

        /// Radius of the hex disk
        #[arg(short, long)]
        radius: Option<i32>,

        /// Number of countries to grow
        #[arg(short = 'n', long)]
        count: Option<i32>,

        #[arg(long)]
        json: bool,
    },

    /// Inspect one tile of the generated map
    Inspect {
        /// Tile id in "q,r" form
        tile: String,

        #[arg(short, long)]
        seed: Option<u64>,
    },
}

const DEFAULT_CONFIG: &str = "worldgen.toml";

/// Load the config file. Without `--config`, a missing default file means defaults.
fn load_params(config: Option<&str>) -> Result<GenerationParams, String> {
    match config {
        Some(path) => GenerationParams::from_file(Path::new(path)),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            GenerationParams::from_file(Path::new(DEFAULT_CONFIG))
        }
        None => Ok(GenerationParams::default()),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();

    let mut params = match load_params(cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error loading generation config: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&params.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Generate { seed, json } => {
            if let Some(s) = seed {
                params.seed = s;
            }
            commands::generate(&params, json).map(|_| ())
        }

        Commands::Countries {
            seed,
            radius,
            count,
            json,
        } => {
            let mut country_params = params.countries.clone();
            country_params.seed = seed.or(params.requested_seed());
            if let Some(r) = radius {
                country_params.grid_radius = r;
            }
            if let Some(n) = count {
                country_params.num_countries = n;
            }
            commands::countries(&country_params, json)
        }

        Commands::Inspect { tile, seed } => {
            if let Some(s) = seed {
                params.seed = s;
            }
            commands::inspect(&params, &tile)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
