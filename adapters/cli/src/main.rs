#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, prints and verifies Pinball Panic grids.

mod grid_transfer;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pinball_panic_core::{Command, Event, GridConfiguration, ObjectKind};
use pinball_panic_system_generation::{
    GenerationSettings, GridEngine, DEFAULT_MAX_ATTEMPTS, DEFAULT_SEARCH_BUDGET,
};
use pinball_panic_system_trajectory::replay;
use pinball_panic_world::{self as world, query, render, Board};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::grid_transfer::GridSnapshot;

/// Command-line arguments accepted by the Pinball Panic CLI.
#[derive(Debug, Parser)]
#[command(author, version, about = "Pinball Panic grid generator", long_about = None)]
struct CliArgs {
    /// Lowers the default log level to debug.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generates one or more grids and prints them.
    Generate(GenerateArgs),
    /// Decodes a grid transfer string and replays the ball through it.
    Verify {
        /// String previously printed by `generate --format transfer`.
        transfer: String,
    },
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Edge length of the square grid.
    #[arg(long, default_value_t = 5)]
    size: u32,
    /// Fewest object cells to place.
    #[arg(long, default_value_t = 1)]
    min_objects: u32,
    /// Most object cells to place.
    #[arg(long, default_value_t = 1)]
    max_objects: u32,
    /// Object types the grid may contain.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "bumper")]
    objects: Vec<ObjectArg>,
    /// Seed for reproducible grids; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Generation attempts before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,
    /// Search nodes expanded per attempt.
    #[arg(long, default_value_t = DEFAULT_SEARCH_BUDGET)]
    budget: u32,
    /// Number of grids to generate.
    #[arg(long, default_value_t = 1)]
    count: u32,
    /// How each grid is printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,
    /// Draws the solution path into the text rendering.
    #[arg(long)]
    show_path: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ObjectArg {
    Bumper,
    Tunnel,
    Teleporter,
    ActivatedBumper,
    DirectionalBumper,
}

impl From<ObjectArg> for ObjectKind {
    fn from(value: ObjectArg) -> Self {
        match value {
            ObjectArg::Bumper => ObjectKind::Bumper,
            ObjectArg::Tunnel => ObjectKind::Tunnel,
            ObjectArg::Teleporter => ObjectKind::Teleporter,
            ObjectArg::ActivatedBumper => ObjectKind::ActivatedBumper,
            ObjectArg::DirectionalBumper => ObjectKind::DirectionalBumper,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Text rendering followed by the exit cell.
    Ascii,
    /// Single-line transfer string.
    Transfer,
    /// Text rendering followed by the transfer string.
    Both,
}

/// Entry point for the Pinball Panic command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        CliCommand::Generate(generate_args) => generate(generate_args),
        CliCommand::Verify { transfer } => verify(&transfer),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(args: GenerateArgs) -> Result<()> {
    let allowed = args.objects.iter().copied().map(ObjectKind::from);
    let config = GridConfiguration::new(args.size, args.min_objects, args.max_objects, allowed)
        .context("could not configure the grid")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut engine = GridEngine::with_rng(
        config,
        ChaCha8Rng::seed_from_u64(seed),
        GenerationSettings::new(args.attempts, args.budget),
    );
    let settings = engine.settings();
    info!(
        seed,
        size = args.size,
        max_attempts = settings.max_attempts,
        search_budget = settings.search_budget,
        "generating grids"
    );

    for index in 0..args.count {
        engine
            .generate()
            .with_context(|| format!("grid {} of {}", index + 1, args.count))?;
        let solution = engine
            .solution()
            .context("generated grid has no solution")?;
        debug!(
            grid = index + 1,
            steps = solution.steps(),
            turns = solution.turns(),
            "grid ready"
        );

        if index > 0 && args.format != OutputFormat::Transfer {
            println!();
        }
        if args.format != OutputFormat::Transfer {
            if args.show_path {
                print!("{}", engine.render_solution());
            } else {
                print!("{}", engine.render());
            }
            let exit = solution.exit();
            println!("exit: row {} column {}", exit.row(), exit.column());
        }
        if args.format != OutputFormat::Ascii {
            println!("{}", GridSnapshot::capture(engine.board()).encode()?);
        }
    }

    Ok(())
}

fn verify(transfer: &str) -> Result<()> {
    let snapshot = GridSnapshot::decode(transfer).context("could not read the grid string")?;
    let size = snapshot.size;
    let layout = snapshot.into_layout()?;

    let mut board = Board::new(size);
    let mut events = Vec::new();
    world::apply(&mut board, Command::CommitLayout { layout }, &mut events);
    if let Some(Event::LayoutRejected { reason }) = events
        .iter()
        .find(|event| matches!(event, Event::LayoutRejected { .. }))
    {
        bail!("grid was rejected: {reason:?}");
    }

    print!("{}", render::to_ascii(&board));
    let trajectory = replay(query::grid_view(&board)).context("ball does not reach the exit")?;
    let exit = trajectory.exit();
    println!(
        "exit: row {} column {} after {} steps",
        exit.row(),
        exit.column(),
        trajectory.steps()
    );
    Ok(())
}
