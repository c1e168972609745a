//! npc-sim - headless driver for the NPC controllers.
//!
//! - `npc-sim patrol` - walk a patrol loop through a maze, optionally chasing a player
//! - `npc-sim oscillate` - run the two-state oscillator
//! - `npc-sim path` - print a grid path between two cells

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use npc_agents::{
    Body, EntityHandle, OscillatorController, PatrolController, Sandbox, SimConfig,
};
use npc_core::{SpatialWorldView, TickContext};
use npc_nav::{NavGrid, Pathfinder};

/// Maze used when no `--maze` file is given: header `node_size width height`,
/// then one row per line with `x` marking walls.
const BUILTIN_MAZE: &str = "\
4 8 6
xxxxxxxx
x......x
x.xx.x.x
x.x..x.x
x......x
xxxxxxxx
";

#[derive(Parser)]
#[command(name = "npc-sim")]
#[command(about = "Run NPC controllers in a headless sandbox", version)]
struct Cli {
    /// YAML file with controller and sandbox tuning
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patrol between two maze cells
    Patrol {
        /// Maze file (defaults to a built-in maze)
        #[arg(long)]
        maze: Option<PathBuf>,

        /// Start cell as `x,y`
        #[arg(long, default_value = "1,1", value_parser = parse_cell)]
        from: (i32, i32),

        /// Far end of the patrol loop as `x,y`
        #[arg(long, default_value = "6,4", value_parser = parse_cell)]
        to: (i32, i32),

        /// Number of ticks to simulate
        #[arg(long, default_value_t = 600)]
        ticks: u64,

        /// Seconds per tick
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Place a player at `x,y` and enable chasing it
        #[arg(long, value_parser = parse_cell)]
        player: Option<(i32, i32)>,

        /// Pause and turn at every waypoint
        #[arg(long)]
        look_around: bool,
    },

    /// Run the oscillating controller
    Oscillate {
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 20)]
        ticks: u64,

        /// Seconds per tick
        #[arg(long, default_value_t = 0.25)]
        dt: f32,
    },

    /// Print the grid path between two cells
    Path {
        /// Maze file (defaults to a built-in maze)
        #[arg(long)]
        maze: Option<PathBuf>,

        /// Start cell as `x,y`
        #[arg(long, value_parser = parse_cell)]
        from: (i32, i32),

        /// Goal cell as `x,y`
        #[arg(long, value_parser = parse_cell)]
        to: (i32, i32),
    },
}

fn parse_cell(raw: &str) -> Result<(i32, i32), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {raw:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in {raw:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in {raw:?}: {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let config = SimConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Patrol {
            maze,
            from,
            to,
            ticks,
            dt,
            player,
            look_around,
        } => run_patrol(config, maze.as_deref(), from, to, ticks, dt, player, look_around),
        Commands::Oscillate { ticks, dt } => run_oscillate(config, ticks, dt),
        Commands::Path { maze, from, to } => print_path(maze.as_deref(), from, to),
    }
}

fn load_maze(maze: Option<&Path>) -> Result<NavGrid> {
    match maze {
        Some(path) => NavGrid::load(path)
            .with_context(|| format!("Failed to load maze {}", path.display())),
        None => NavGrid::parse(BUILTIN_MAZE).context("Failed to parse built-in maze"),
    }
}

/// Static bodies on every wall cell so walls block line of sight.
fn spawn_walls(sandbox: &mut Sandbox, grid: &NavGrid) -> usize {
    let mut count = 0;
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if grid.is_blocked(x, y) {
                sandbox.spawn(
                    Body::new(grid.node_position(x, y))
                        .with_mass(0.0)
                        .with_radius(grid.node_size() * 0.5),
                );
                count += 1;
            }
        }
    }
    count
}

#[allow(clippy::too_many_arguments)]
fn run_patrol(
    mut config: SimConfig,
    maze: Option<&Path>,
    from: (i32, i32),
    to: (i32, i32),
    ticks: u64,
    dt: f32,
    player: Option<(i32, i32)>,
    look_around: bool,
) -> Result<()> {
    let grid = load_maze(maze)?;
    config.patrol.chase |= player.is_some();
    config.patrol.look_around |= look_around;

    let mut sandbox = Sandbox::from_config(&config.sandbox);
    let walls = spawn_walls(&mut sandbox, &grid);
    let start = grid.node_position(from.0, from.1);
    let agent = sandbox.spawn(
        Body::new(start)
            .with_mass(config.sandbox.body_mass)
            .with_radius(config.sandbox.body_radius),
    );
    let target: Option<EntityHandle> = player.map(|(x, y)| {
        sandbox.spawn(
            Body::new(grid.node_position(x, y))
                .with_mass(0.0)
                .with_radius(config.sandbox.body_radius),
        )
    });

    tracing::info!(
        width = grid.width(),
        height = grid.height(),
        walls,
        from = ?from,
        to = ?to,
        "starting patrol"
    );

    let mut patrol = PatrolController::from_path(
        agent,
        &grid,
        start,
        grid.node_position(to.0, to.1),
        config.patrol.clone(),
    );
    patrol.set_target(target);

    let mut ctx = TickContext::new(0, dt);
    for _ in 0..ticks {
        patrol.update(&ctx, &mut sandbox);
        sandbox.step(dt);
        ctx = ctx.next();
    }

    let position = sandbox.position(agent).context("agent body vanished")?;
    println!("Patrol summary");
    println!("==============");
    println!();
    println!("Ticks:          {ticks} (dt {dt}s)");
    println!("Waypoints:      {}", patrol.waypoints().len());
    println!("Cursor:         {}", patrol.cursor());
    println!("Completed runs: {}", patrol.completed_runs());
    if let Some(outcome) = patrol.last_outcome() {
        println!("Last outcome:   {outcome:?}");
    }
    println!(
        "Position:       ({:.2}, {:.2}, {:.2})",
        position.x, position.y, position.z
    );
    if patrol.is_idle() {
        println!();
        println!("No path between {from:?} and {to:?}; the agent stayed idle.");
    }
    Ok(())
}

fn run_oscillate(config: SimConfig, ticks: u64, dt: f32) -> Result<()> {
    let mut sandbox = Sandbox::from_config(&config.sandbox);
    let entity = sandbox.spawn(Body::new(Default::default()));
    let mut oscillator = OscillatorController::new(entity, config.oscillator)
        .context("Failed to build oscillator state machine")?;

    let mut ctx = TickContext::new(0, dt);
    for _ in 0..ticks {
        if oscillator.update(&ctx, &mut sandbox).is_some() {
            let position = sandbox.position(entity).unwrap_or_default();
            println!(
                "tick {:>4}: now {:<10} counter {:>6.3}  x {:>6.2}",
                ctx.tick,
                oscillator.active_state_name().unwrap_or("?"),
                oscillator.counter(),
                position.x
            );
        }
        ctx = ctx.next();
    }

    let position = sandbox.position(entity).unwrap_or_default();
    println!(
        "after {ticks} ticks: {} (counter {:.3}, x {:.2})",
        oscillator.active_state_name().unwrap_or("?"),
        oscillator.counter(),
        position.x
    );
    Ok(())
}

fn print_path(maze: Option<&Path>, from: (i32, i32), to: (i32, i32)) -> Result<()> {
    let grid = load_maze(maze)?;
    let start = grid.node_position(from.0, from.1);
    let end = grid.node_position(to.0, to.1);

    match grid.find_path(start, end) {
        Some(path) => {
            println!("{} waypoints from {from:?} to {to:?}:", path.len());
            for point in path.iter() {
                println!("  ({:.1}, {:.1}, {:.1})", point.x, point.y, point.z);
            }
        }
        None => println!("No path from {from:?} to {to:?}"),
    }
    Ok(())
}
