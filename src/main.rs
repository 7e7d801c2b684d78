//! Command-line entry point: load one beatmap and rate one play on it.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use osrpp::{
    Beatmap, BeatmapRepository, CacheStore, Config, HttpTransport, OsuApiClient,
    PerformanceCalculator, PlayParams,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Rate a play on an osu! beatmap
#[derive(Parser, Debug)]
#[command(name = "osrpp")]
#[command(version)]
struct Cli {
    /// Where to find the beatmap
    #[command(subcommand)]
    source: Source,

    /// Configuration file
    #[arg(long, global = true, default_value = "osrpp.toml")]
    config: PathBuf,

    /// Legacy mod bitmask (e.g. 16 = HR)
    #[arg(short, long, global = true, default_value_t = 0)]
    mods: u32,

    /// Accuracy in percent
    #[arg(short, long, global = true, default_value_t = 100.0)]
    accuracy: f64,

    /// Achieved combo (defaults to the map's max combo)
    #[arg(short, long, global = true)]
    combo: Option<u32>,

    /// Miss count
    #[arg(short = 'x', long, global = true, default_value_t = 0)]
    misses: u32,
}

#[derive(Subcommand, Debug)]
enum Source {
    /// Beatmap id on osu!
    Id { id: u64 },
    /// MD5 checksum of the .osu file (needs API credentials)
    Checksum { md5: String },
    /// Path to a local .osu file, for custom beatmaps
    Path { path: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> osrpp::Result<()> {
    let config = Config::load(&cli.config)?;

    let cache = CacheStore::new(&config.cache_dir);
    cache.ensure_directories()?;

    let mut repository =
        BeatmapRepository::new(cache, HttpTransport::new(&config), config.endpoints.clone());
    match OsuApiClient::from_config(&config) {
        Ok(client) => repository = repository.with_lookup(client),
        Err(e) => warn!("[API] {}; checksum lookups are disabled", e),
    }
    repository.ensure_default_assets();

    let beatmap = match &cli.source {
        Source::Id { id } => repository.load_id(*id)?,
        Source::Checksum { md5 } => repository.load_checksum(md5)?,
        Source::Path { path } => repository.load_path(path)?,
    };
    describe(&beatmap);

    let params = PlayParams {
        mods: cli.mods,
        accuracy: cli.accuracy,
        combo: cli.combo.or(Some(beatmap.max_combo()).filter(|c| *c > 0)),
        misses: cli.misses,
    };
    let attrs = PerformanceCalculator::new().calculate(&beatmap, &params)?;

    println!("{:.2}pp ({:.2}*, max combo {})", attrs.pp, attrs.stars, attrs.max_combo);
    for (name, value) in [
        ("aim", attrs.aim),
        ("speed", attrs.speed),
        ("accuracy", attrs.accuracy),
        ("flashlight", attrs.flashlight),
        ("difficulty", attrs.difficulty),
    ] {
        if let Some(value) = value {
            println!("  {:<10} {:.2}pp", name, value);
        }
    }
    Ok(())
}

fn describe(beatmap: &Beatmap) {
    info!(
        "[Beatmap] {} - {} [{}] (id {}, set {})",
        beatmap.artist(),
        beatmap.title(),
        beatmap.difficulty(),
        beatmap.id(),
        beatmap.set_id()
    );
}
