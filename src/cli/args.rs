use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "japa",
    version,
    about = "A terminal companion for japa practice — mantra counting, malas, streaks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record mantra recitations from the command line
    Count {
        /// How many recitations to record
        #[arg(default_value_t = 1)]
        times: u32,
    },
    /// Set the daily mala goal (1-108)
    Goal {
        /// Malas per day
        malas: u32,
    },
    /// Set the default playback speed for new sessions
    Speed {
        /// Speed multiplier (0.75, 1.0, 1.5)
        speed: f64,
    },
    /// Show practice statistics
    Stats {
        /// Show an ASCII heatmap for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Manage mantra audio sources
    Sounds {
        #[command(subcommand)]
        action: SoundCommands,
    },
    /// Reset counters
    Reset {
        #[command(subcommand)]
        target: ResetCommands,
    },
    /// Export a weekly text summary to stdout
    Export,
}

#[derive(Subcommand, Debug)]
pub enum SoundCommands {
    /// Add or replace a named audio source (last write wins on the name)
    Add {
        /// Display name
        name: String,
        /// File path or URL
        url: String,
    },
    /// List all audio sources
    List,
    /// Pick the active audio source
    Select {
        /// Name of the source to use
        name: String,
    },
    /// Remove an audio source by name
    Remove {
        /// Name of the source to remove
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResetCommands {
    /// Reset the session counters (current bead and session malas)
    Daily,
    /// Erase all statistics, history and achievements — irreversible
    All {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
