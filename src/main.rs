use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tictactoe_mlp::activation::Sigmoid;
use tictactoe_mlp::agents::{Agent, HumanAgent, MinimaxAgent, NetworkAgent, RandomAgent};
use tictactoe_mlp::board_game::Player::{P1, P2};
use tictactoe_mlp::config::{AppConfig, Opponent};
use tictactoe_mlp::error::WeightsError;
use tictactoe_mlp::network::Network;
use tictactoe_mlp::self_play::play_session;
use tictactoe_mlp::weights::WeightStore;

/// Train a tic-tac-toe value network by playing games against an opponent.
#[derive(Parser)]
#[command(name = "tictactoe-mlp", about = "Train a tic-tac-toe value network")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of games
    #[arg(long)]
    games: Option<usize>,

    /// Override the opponent
    #[arg(long, value_enum)]
    opponent: Option<Opponent>,

    /// Override how many plies the network agent searches
    #[arg(long)]
    depth: Option<usize>,

    /// Override the board size
    #[arg(long)]
    size: Option<usize>,

    /// Seed for weight initialisation and the random opponent
    #[arg(long)]
    seed: Option<u64>,

    /// Weight file to load the network from and save it back to
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Play without updating the network
    #[arg(long)]
    no_train: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, &cli.log_level),
    )
    .init();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(games) = cli.games {
        config.session.games = games;
    }
    if let Some(opponent) = cli.opponent {
        config.session.opponent = opponent;
    }
    if let Some(depth) = cli.depth {
        config.network.cutoff_depth = depth;
    }
    if let Some(size) = cli.size {
        config.board.size = size;
    }
    if cli.seed.is_some() {
        config.session.seed = cli.seed;
    }
    if cli.weights.is_some() {
        config.session.weights = cli.weights.clone();
    }
    config.validate().context("invalid settings")?;

    let mut rng = match config.session.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut store = match &config.session.weights {
        Some(path) if path.exists() => WeightStore::load(path)
            .with_context(|| format!("loading weights from {}", path.display()))?,
        _ => WeightStore::new(),
    };

    let layout = config.layout();
    let name = config.network.name.as_str();
    let network = match store.network(name, &layout, config.network.learning_rate, Sigmoid) {
        Ok(network) => {
            info!("loaded network '{}' with layout {:?}", name, layout);
            network
        }
        Err(WeightsError::MissingNetwork(_)) => {
            info!("created network '{}' with layout {:?}", name, layout);
            Network::create(&layout, config.network.learning_rate, Sigmoid, &mut rng)
        }
        Err(e) => return Err(e).context("weight file does not match the configured network"),
    };

    let training = !cli.no_train;
    let depth = config.network.cutoff_depth;
    let mut opponent: Box<dyn Agent> = match config.session.opponent {
        Opponent::Minimax => Box::new(MinimaxAgent::with_threads(P2, config.session.threads)),
        Opponent::Random => match config.session.seed {
            Some(seed) => Box::new(RandomAgent::with_seed(P2, seed.wrapping_add(1))),
            None => Box::new(RandomAgent::new(P2)),
        },
        // sparring partner starts from the same weights, its training is not kept
        Opponent::Network => Box::new(
            NetworkAgent::new(P2, network.clone(), depth).with_training(training),
        ),
        Opponent::Human => Box::new(HumanAgent::new(P2)),
    };
    let mut learner = NetworkAgent::new(P1, network, depth).with_training(training);

    info!(
        "playing {} games of {}x{} against {}",
        config.session.games,
        config.board.size,
        config.board.size,
        opponent.name()
    );
    let summary = play_session(
        &mut learner,
        opponent.as_mut(),
        config.session.games,
        config.board.size,
        config.session.alternate_first,
    )?;

    if let Some(last) = &summary.last {
        println!("{}", last.board);
    }
    println!(
        "{} games: {} {} wins, {} {} wins, {} ties (scores {} / {})",
        summary.games,
        summary.a_wins,
        learner.name(),
        summary.b_wins,
        opponent.name(),
        summary.ties,
        learner.score(),
        opponent.score()
    );

    if let Some(path) = &config.session.weights {
        if training {
            store.insert(name, learner.into_network().into_weights());
            store
                .save(path)
                .with_context(|| format!("saving weights to {}", path.display()))?;
            info!("saved network '{}' to {}", name, path.display());
        }
    }

    Ok(())
}
