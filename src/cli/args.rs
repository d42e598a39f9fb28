use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "barakah", version, author, about = "A terminal companion for worship habit tracking and reward scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a prayer with its status
    Log {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
        /// Status: on_time, delayed, missed, qadaa
        status: String,
        /// Prayed in congregation (on-time prayers only)
        #[arg(long)]
        jamaah: bool,
        /// Friday sunnah checklist items (Jumuah only), comma separated
        #[arg(long, value_delimiter = ',')]
        friday: Vec<String>,
        /// Log for a past date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show today's performance summary
    Today,
    /// Show current and longest prayer streaks
    Streak,
    /// Show a prayer activity heatmap
    Heatmap {
        /// Trailing window in days
        #[arg(long, default_value_t = 60)]
        days: u32,
    },
    /// Show weekly (default) or monthly statistics
    Stats {
        /// Use a 30-day window with daily average
        #[arg(long)]
        month: bool,
    },
    /// Sunnah habit tracking
    Habit {
        #[command(subcommand)]
        action: HabitCommands,
    },
    /// Show direction and distance to the Kaaba
    Qibla {
        /// Raw magnetometer sample as x,y,z
        #[arg(long)]
        mag: Option<String>,
    },
    /// Show the Hijri date for today or a given Gregorian date
    Hijri {
        /// Gregorian date (YYYY-MM-DD)
        date: Option<String>,
    },
    /// Export a JSON summary to stdout
    Export,
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// List habits with their tier descriptions
    List,
    /// Log a habit at a commitment tier
    Log {
        /// Habit name
        name: String,
        /// Tier: basic, companion, prophetic
        level: String,
        /// Optional reflection note
        #[arg(long)]
        reflection: Option<String>,
        /// Log for a past date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Rank habits by log count over a trailing window
    Top {
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// How many habits to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Add a custom habit with three tier descriptions
    Add {
        /// Habit name
        name: String,
        /// Basic tier description
        #[arg(long)]
        basic: String,
        /// Companion tier description
        #[arg(long)]
        companion: String,
        /// Prophetic tier description
        #[arg(long)]
        prophetic: String,
    },
}
