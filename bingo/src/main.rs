use std::error::Error;
use std::path::PathBuf;

use bingo::app::BingoApp;
use bingo::audio::{AudioChannel, SilentChannel};
use bingo::board::MAX_NUMBER;
use bingo::headless::HeadlessRunner;
use bingo::session::LiveSession;
use bingo::settings::{BingoSettings, SettingsStore};
use clap::Parser;
use engine::app::{AppConfig, DEFAULT_FRAME_INTERVAL, run_game};
use winit::dpi::PhysicalSize;

#[derive(Debug, Parser)]
#[command(name = "bingo")]
#[command(about = "Bingo number roulette: draws 1-75 without repeats and keeps a live board")]
struct Cli {
    /// Settings file (default: $BINGO_SETTINGS_PATH, then the user config dir).
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Seed for a reproducible draw order.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = false)]
    mute: bool,
    /// Play rounds on a virtual clock without opening a window.
    #[arg(long, default_value_t = false)]
    headless: bool,
    /// Rounds to play in headless mode.
    #[arg(long, default_value_t = MAX_NUMBER as usize)]
    rounds: usize,
    /// Print the headless report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let store = cli
        .settings
        .clone()
        .map(SettingsStore::at)
        .unwrap_or_else(SettingsStore::from_env);
    let mut settings = store.load();
    log::debug!("settings from {}", store.path().display());
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    if cli.mute {
        settings.audio.mute_all = true;
    }

    if cli.headless {
        return run_headless(&settings, cli.rounds, cli.json);
    }

    let config = AppConfig {
        title: "Bingo Number Roulette".to_string(),
        desired_size: PhysicalSize::new(settings.window.width, settings.window.height),
        clamp_to_monitor: true,
        vsync: settings.window.vsync,
        frame_interval: DEFAULT_FRAME_INTERVAL,
    };
    run_game(config, BingoApp::new(settings))
}

fn run_headless(settings: &BingoSettings, rounds: usize, json: bool) -> Result<(), Box<dyn Error>> {
    let silent = || -> Box<dyn AudioChannel> { Box::new(SilentChannel::new()) };
    let session = LiveSession::live(settings.timing, settings.seed, silent(), silent());
    let report = HeadlessRunner::new(session).run(rounds);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
