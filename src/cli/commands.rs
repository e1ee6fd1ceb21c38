use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `DesignSync` - interior restyling proxy and state sync.
#[derive(Parser, Debug)]
#[command(name = "designsync")]
#[command(version = "0.1.0")]
#[command(about = "Image restyling proxy with debounced state persistence.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the generation gateway
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Restyle one image file and print the result JSON
    Generate {
        /// Path to a JPEG/PNG/WebP image
        image: PathBuf,

        /// Style label (luxury, scandinavian, arabic, anything else = modern minimal)
        #[arg(short, long)]
        style: Option<String>,
    },

    /// Read or write the persisted application state
    State {
        #[command(subcommand)]
        state_command: StateCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print the current state (remote first, then local)
    Load,
    /// Store a new state and flush it before exiting
    Save {
        /// Inline JSON document
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,

        /// Read the JSON document from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}
