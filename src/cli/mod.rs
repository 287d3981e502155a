pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hearsay")]
#[command(about = "Read Reddit posts aloud", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/hearsay/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a post aloud, then take playback commands on stdin
    Play {
        /// Reddit post, share or subreddit URL
        url: String,

        /// Exit when the narration ends
        #[arg(long)]
        once: bool,
    },
    /// Print the text that would be read
    Text {
        /// Reddit post, share or subreddit URL
        url: String,
    },
    /// Print the JSON endpoint a link resolves to
    Resolve {
        /// Reddit post, share or subreddit URL
        url: String,
    },
}
