use clap::{Parser, Subcommand};
use std::io;
use termglobe::config::{GlobeArgs, GlobeConfig};
use termglobe::globe::view::RenderMode;
use termglobe::settings::Settings;
use termglobe::host;

#[derive(Parser)]
#[command(name = "termglobe")]
#[command(version)]
#[command(about = "Interactive terminal globe: career locations, great-circle arcs and drag-to-spin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the 3D globe (drag, wheel, arrow keys; ? for help)
    Globe {
        #[command(flatten)]
        args: GlobeArgs,
    },

    /// Pan the wrapping flat map
    Map {
        #[command(flatten)]
        args: GlobeArgs,
    },

    /// List the loaded locations
    Locations {
        #[command(flatten)]
        args: GlobeArgs,
    },

    /// Print a single frame to stdout (no interactive display)
    Print {
        /// Render the flat map instead of the sphere
        #[arg(short, long)]
        flat: bool,

        /// Width in columns (defaults to the terminal width)
        #[arg(short = 'W', long)]
        width: Option<u16>,

        /// Height in rows (defaults to the terminal height)
        #[arg(short = 'H', long)]
        height: Option<u16>,

        #[command(flatten)]
        args: GlobeArgs,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    // also starts file logging, so every command logs from here on
    let settings = Settings::load();

    match cli.command {
        Commands::Globe { args } => {
            let config = GlobeConfig::from_env(RenderMode::Sphere, &args, &settings.globe);
            host::run_interactive(&config)
        }
        Commands::Map { args } => {
            let config = GlobeConfig::from_env(RenderMode::Flat, &args, &settings.globe);
            host::run_interactive(&config)
        }
        Commands::Locations { args } => {
            let config = GlobeConfig::from_env(RenderMode::Sphere, &args, &settings.globe);
            host::run_locations(&config)
        }
        Commands::Print { flat, width, height, args } => {
            let mode = if flat { RenderMode::Flat } else { RenderMode::Sphere };
            let config = GlobeConfig::from_env(mode, &args, &settings.globe);
            host::run_print(&config, width, height)
        }
    }
}
