//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::collector::PreferenceForm;

/// TripAI - AI travel planner
#[derive(Parser)]
#[command(
    name = "tripai",
    about = "Collects trip preferences and turns them into destinations and itineraries",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the session API (and the front-end, if configured)
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the planner proxy in front of the LLM
    Proxy {
        /// Port to listen on (defaults to server.proxy_port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Plan a trip from the terminal
    Plan(PlanArgs),
}

/// Trip form fields for `tripai plan`
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Number of travelers
    #[arg(short, long, default_value_t = 1)]
    pub travelers: u32,

    /// Budget per person
    #[arg(short, long, default_value_t = 1_000_000)]
    pub budget: u64,

    /// Currency code (KRW, USD, EUR, JPY)
    #[arg(long, default_value = "KRW")]
    pub currency: String,

    /// Travel companions (Solo, Couple, Family, Friends, Parents, Other)
    #[arg(long, default_value = "Solo")]
    pub companion: String,

    /// Preferred destination; leave out to let the planner decide
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Free-form requests for the planner
    #[arg(short, long)]
    pub requests: Option<String>,

    /// Travel style tag (repeatable)
    #[arg(short, long = "style")]
    pub styles: Vec<String>,

    /// Open the itinerary of the n-th recommendation (1-based)
    #[arg(long, value_name = "N")]
    pub select: Option<usize>,
}

impl From<&PlanArgs> for PreferenceForm {
    fn from(args: &PlanArgs) -> Self {
        Self {
            start_date: args.start.clone(),
            end_date: args.end.clone(),
            travelers: args.travelers,
            budget_per_person: args.budget,
            currency: args.currency.clone(),
            companion: args.companion.clone(),
            preferred_destination: args.destination.clone().unwrap_or_default(),
            special_requests: args.requests.clone().unwrap_or_default(),
            travel_styles: args.styles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_arguments_map_to_form() {
        let cli = Cli::try_parse_from([
            "tripai", "plan", "--start", "2024-06-01", "--end", "2024-06-03", "--travelers", "2",
            "--companion", "커플", "--style", "food", "--style", "culture", "--select", "2",
        ])
        .unwrap();

        let Some(Command::Plan(args)) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.select, Some(2));

        let form = PreferenceForm::from(&args);
        assert_eq!(form.travelers, 2);
        assert_eq!(form.budget_per_person, 1_000_000);
        assert_eq!(form.currency, "KRW");
        assert_eq!(form.travel_styles, vec!["food", "culture"]);
        assert!(form.collect().is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tripai", "serve", "--port", "4000", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Serve { port: Some(4000) })));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["tripai"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }
}
