use crate::listing::ConditionFilter;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bird-strike")]
#[command(about = "Submit and review campus bird-window collision reports")]
#[command(version = "1.0")]
pub(crate) struct Args {
    /// Base URL of the hosted record store
    #[arg(short, long, env = "SUPABASE_URL")]
    pub url: String,

    /// API key sent with every request
    #[arg(short, long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub key: String,

    /// Table holding the reports
    #[arg(long, default_value = "bird_strikes")]
    pub table: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "10")]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Aggregated statistics, charts and insights
    Dashboard,

    /// Recent reports, optionally narrowed to one condition
    List {
        #[arg(short, long, value_enum, default_value_t = ConditionFilter::All)]
        condition: ConditionFilter,
    },

    /// Dashboard and report list side by side, each loaded independently
    Overview {
        #[arg(short, long, value_enum, default_value_t = ConditionFilter::All)]
        condition: ConditionFilter,
    },

    /// Submit a new strike report
    Submit(SubmitArgs),

    /// Save all reports to a CSV file
    Export {
        /// Output CSV filename
        #[arg(short, long, default_value = "bird_strikes.csv")]
        output: String,

        #[arg(short, long, value_enum, default_value_t = ConditionFilter::All)]
        condition: ConditionFilter,
    },

    /// Print the building list accepted by the form
    Buildings,

    /// Print the common species list
    Species,
}

#[derive(clap::Args)]
pub(crate) struct SubmitArgs {
    /// Date of the strike (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Time of the strike (HH:MM), defaults to now
    #[arg(short = 'T', long)]
    pub time: Option<String>,

    /// Leave the time unrecorded
    #[arg(long, conflicts_with = "time")]
    pub no_time: bool,

    /// Building, as listed by `buildings`
    #[arg(short, long)]
    pub building: String,

    /// deceased, injured, stunned or unknown
    #[arg(short, long)]
    pub condition: String,

    /// Where on the building, e.g. "North entrance, 2nd floor east wing"
    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub species: Option<String>,

    /// Contact email (shown redacted in the report list)
    #[arg(short, long)]
    pub email: Option<String>,

    #[arg(short, long)]
    pub notes: Option<String>,
}
