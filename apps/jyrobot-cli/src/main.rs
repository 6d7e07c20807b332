use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use jyrobot_common::Picture;
use jyrobot_config::{Command, SimConfig};
use jyrobot_render::{DebugTextRenderer, RenderView, Renderer, save_picture};
use jyrobot_tools::WorldInspector;
use jyrobot_widget::{RobotWidget, SimulatorView};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jyrobot-cli", about = "CLI tool for jyrobot simulations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print a config as JSON
    Config {
        /// Config file (JSON or YAML); the stock fleet when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Drive the simulator for a number of updates
    Run {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Number of updates to run
        #[arg(short, long, default_value = "20")]
        ticks: u64,
        /// Velocity command INDEX,VX,VY,VA sent before the first update
        #[arg(short, long = "command", value_parser = parse_command)]
        commands: Vec<Command>,
    },
    /// Save a camera picture (or the top-down view) as PNG or PPM
    Picture {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Robot index
        #[arg(short, long, default_value = "0")]
        robot: usize,
        /// Camera index on that robot
        #[arg(short, long, default_value = "0")]
        camera: usize,
        /// Updates to run before taking the picture
        #[arg(short, long, default_value = "1")]
        ticks: u64,
        /// Write the top-down frame instead of a camera picture
        #[arg(long)]
        top_down: bool,
        /// Output file; the extension picks the format (.png, .ppm)
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn parse_command(s: &str) -> Result<Command, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [index, vx, vy, va] = parts.as_slice() else {
        return Err(format!("expected INDEX,VX,VY,VA, got {s:?}"));
    };
    let number = |v: &str| v.parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Command::new(
        index.parse().map_err(|e| format!("{index:?}: {e}"))?,
        number(vx)?,
        number(vy)?,
        number(va)?,
    ))
}

fn load_config(input: Option<&PathBuf>) -> anyhow::Result<SimConfig> {
    match input {
        Some(path) => {
            SimConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(SimConfig::default_fleet()),
    }
}

/// Build a widget and view for `config`, send `commands`, then update `ticks` times.
fn simulate(
    config: &SimConfig,
    commands: &[Command],
    ticks: u64,
) -> anyhow::Result<(RobotWidget, SimulatorView)> {
    let mut widget = RobotWidget::new(config)?;
    let mut view = SimulatorView::new();
    // Only the latest pending command survives, so hand each one over.
    for command in commands {
        widget.set_robot(command.index, command.vx, command.vy, command.va)?;
        view.sync(&mut widget)?;
    }
    for _ in 0..ticks {
        widget.update();
    }
    view.sync(&mut widget)?;
    Ok((widget, view))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("jyrobot-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "widget: {} ({} {}/{})",
                jyrobot_widget::crate_info(),
                jyrobot_widget::MODULE_NAME,
                jyrobot_widget::MODEL_NAME,
                jyrobot_widget::VIEW_NAME
            );
            println!("config: {}", jyrobot_config::crate_info());
            println!("render: {}", jyrobot_render::crate_info());
            println!("tools: {}", jyrobot_tools::crate_info());
        }
        Commands::Config { input, pretty } => {
            let config = load_config(input.as_ref())?;
            let json = if pretty {
                config.to_json_pretty()?
            } else {
                config.to_json()?
            };
            println!("{json}");
        }
        Commands::Run {
            input,
            ticks,
            commands,
        } => {
            let config = load_config(input.as_ref())?;
            let (widget, view) = simulate(&config, &commands, ticks)?;
            let Some(world) = view.world() else {
                bail!("view has no world");
            };
            println!(
                "update_int={} draw_int={} command={:?}",
                widget.update_int(),
                widget.draw_int(),
                widget.command()
            );
            println!("{}", WorldInspector::summary(world));
            for index in 0..world.robots().len() {
                if let Some(robot) = WorldInspector::inspect_robot(world, index) {
                    println!("  {robot}");
                }
            }
            print!(
                "{}",
                DebugTextRenderer::new().render(world, &RenderView::default())
            );
        }
        Commands::Picture {
            input,
            robot,
            camera,
            ticks,
            top_down,
            out,
        } => {
            let config = load_config(input.as_ref())?;
            let (mut widget, mut view) = simulate(&config, &[], ticks)?;
            let picture: Picture = if top_down {
                widget.draw();
                view.sync(&mut widget)?;
                view.frame().cloned().context("view has no frame")?
            } else {
                let world = view.world().context("view has no world")?;
                world.take_picture(robot, camera)?
            };
            save_picture(&picture, &out)?;
            info!(
                path = %out.display(),
                width = picture.width(),
                height = picture.height(),
                "picture written"
            );
        }
    }

    Ok(())
}
