//! Porcupine - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use porcupine_core::raid::{ComposerConfig, RaceId, RacePopulation, UnitCosts};
use porcupine_loader::LoaderConfig;
use porcupine_tools::check::{check_config, ConfigKind};
use porcupine_tools::raid::{plan_raid, RaidInput};
use porcupine_tools::scan::scan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "porcupine-tools")]
#[command(about = "Development tools for Porcupine mods")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a mods folder and report what each mod ships
    Scan {
        /// Mods root; every child directory is a mod
        #[arg(default_value = "mods")]
        path: PathBuf,

        /// Loader config (RON); its mod roots are replaced by PATH
        #[arg(long)]
        config: Option<PathBuf>,

        /// Give every mod its own class namespace
        #[arg(long)]
        isolated: bool,
    },

    /// Compute the raider army a settlement's wealth would field
    Raid {
        /// Settlement wealth in silver
        #[arg(long, allow_negative_numbers = true)]
        wealth: i64,

        /// Price of one pawn
        #[arg(long, default_value_t = 500)]
        cost_per_pawn: u64,

        /// Price of one melee weapon
        #[arg(long, default_value_t = 50)]
        cost_melee: u64,

        /// Price of one ranged weapon
        #[arg(long, default_value_t = 80)]
        cost_ranged: u64,

        /// Price of one armour piece
        #[arg(long, default_value_t = 120)]
        cost_armour: u64,

        /// Soldiers per division
        #[arg(long, default_value_t = 50)]
        pawns_per_division: u64,

        /// Smallest army fielded
        #[arg(long, default_value_t = 10)]
        min_army_size: u64,

        /// Target region census, one population per race
        #[arg(long, value_delimiter = ',')]
        census: Vec<u64>,

        /// Seed for training rolls
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Parse and validate a config file
    CheckConfig {
        /// Config file (RON)
        path: PathBuf,

        /// Config format
        #[arg(long, value_enum, default_value_t = ConfigKind::Loader)]
        kind: ConfigKind,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            isolated,
        } => run_scan(path, config, isolated),
        Commands::Raid {
            wealth,
            cost_per_pawn,
            cost_melee,
            cost_ranged,
            cost_armour,
            pawns_per_division,
            min_army_size,
            census,
            seed,
        } => {
            let input = RaidInput {
                wealth,
                costs: UnitCosts {
                    pawn: cost_per_pawn,
                    melee: cost_melee,
                    ranged: cost_ranged,
                    armour: cost_armour,
                },
                composer: ComposerConfig {
                    pawns_per_division,
                    min_army_size,
                    ..ComposerConfig::default()
                },
                census: census
                    .into_iter()
                    .enumerate()
                    .map(|(index, population)| RacePopulation {
                        race: RaceId(index as u32),
                        population,
                    })
                    .collect(),
                seed,
            };
            plan_raid(&input).map(|plan| print!("{plan}"))
        }
        Commands::CheckConfig { path, kind } => {
            check_config(&path, kind).map(|summary| println!("{summary}"))
        }
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    isolated: bool,
) -> porcupine_tools::Result<()> {
    let mut loader_config = match config {
        Some(file) => LoaderConfig::from_file(&file)?,
        None => LoaderConfig::default(),
    };
    loader_config.mod_roots = vec![path];
    if isolated {
        loader_config.shared_class_space = false;
    }

    tracing::info!("Scanning {}", loader_config.mod_roots[0].display());
    let report = scan(&loader_config)?;
    print!("{report}");
    Ok(())
}
