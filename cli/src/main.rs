mod commands;
mod config;
mod gemini;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    cmd_analyze, cmd_edit, cmd_export, cmd_log, cmd_profile_set, cmd_profile_show, cmd_report,
    cmd_show,
};
use crate::config::Config;
use crate::gemini::GeminiClient;
use mangia_core::service::DiaryService;

#[derive(Parser)]
#[command(
    name = "mangia",
    version,
    about = "A personal food diary with AI nutritional analysis",
    long_about = "\n\n ███╗   ███╗ █████╗ ███╗   ██╗ ██████╗ ██╗ █████╗
 ████╗ ████║██╔══██╗████╗  ██║██╔════╝ ██║██╔══██╗
 ██╔████╔██║███████║██╔██╗ ██║██║  ███╗██║███████║
 ██║╚██╔╝██║██╔══██║██║╚██╗██║██║   ██║██║██╔══██║
 ██║ ╚═╝ ██║██║  ██║██║ ╚████║╚██████╔╝██║██║  ██║
 ╚═╝     ╚═╝╚═╝  ╚═╝╚═╝  ╚═══╝ ╚═════╝ ╚═╝╚═╝  ╚═╝
        il tuo diario alimentare.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log meals and activity for a day
    Log {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Free-text description of the day's meals
        #[arg(short, long)]
        meals: Option<String>,
        /// Free-text description of physical activity
        #[arg(short, long)]
        activity: Option<String>,
        /// Mark the day as non-working (true/false)
        #[arg(long, value_name = "BOOL")]
        day_off: Option<bool>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the entry for a day
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the AI nutritional analysis for a day
    Analyze {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Save the analysis as a text file
        #[arg(long)]
        save: bool,
        /// Directory for saved files (default: current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate an AI report over a period
    Report {
        /// Period: week, month, year
        period: String,
        /// Reference date inside the period (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Save the report as a text file
        #[arg(long)]
        save: bool,
        /// Directory for saved files (default: current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the profile used to personalize analyses
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Export the diary as CSV or PDF
    Export {
        /// Format: csv, pdf
        format: String,
        /// Start date (default: 30 days ago)
        #[arg(long)]
        from: Option<String>,
        /// End date (default: today)
        #[arg(long)]
        to: Option<String>,
        /// Directory for the exported file (default: current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Edit the diary interactively
    Edit {
        /// Date to open (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Set profile fields (only the given flags change)
    Set {
        /// Age in years
        #[arg(long)]
        age: Option<u32>,
        /// Gender: male, female, other
        #[arg(long)]
        gender: Option<String>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Lifestyle: sedentary, moderately_active, active
        #[arg(long)]
        lifestyle: Option<String>,
        /// Goal: lose_weight, gain_muscle, maintain_weight, improve_performance,
        /// eat_healthier, identify_issues
        #[arg(long)]
        goal: Option<String>,
        /// Allergies, intolerances or other conditions
        #[arg(long)]
        conditions: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the stored profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Commands are synchronous; the runtime backs the blocking Gemini client.
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    let service = DiaryService::open(&config.db_path)?;

    match cli.command {
        Commands::Log {
            date,
            meals,
            activity,
            day_off,
            json,
        } => cmd_log(&service, date, meals, activity, day_off, json),
        Commands::Show { date, json } => cmd_show(&service, date, json),
        Commands::Analyze {
            date,
            save,
            out,
            json,
        } => {
            let gemini = GeminiClient::new(Config::gemini_api_key()?);
            cmd_analyze(&service, &gemini, date, save, out, json)
        }
        Commands::Report {
            period,
            date,
            save,
            out,
            json,
        } => {
            let gemini = GeminiClient::new(Config::gemini_api_key()?);
            cmd_report(&service, &gemini, &period, date, save, out, json)
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Set {
                age,
                gender,
                height,
                weight,
                lifestyle,
                goal,
                conditions,
                json,
            } => cmd_profile_set(
                &service, age, gender, height, weight, lifestyle, goal, conditions, json,
            ),
            ProfileCommands::Show { json } => cmd_profile_show(&service, json),
        },
        Commands::Export {
            format,
            from,
            to,
            out,
        } => cmd_export(&service, &format, from, to, out),
        Commands::Edit { date } => cmd_edit(&service, date),
    }
}
