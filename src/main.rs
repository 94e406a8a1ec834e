//! TripAI command line entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing::info;

use tripai::cli::{Cli, Command, PlanArgs};
use tripai::collector::PreferenceForm;
use tripai::config::TripAiConfig;
use tripai::session::{AppStep, Controller};
use tripai::{VERSION, logging, planner, presenter, web};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TripAiConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose);

    match cli.command {
        Some(Command::Serve { port }) => cmd_serve(&config, port).await,
        Some(Command::Proxy { port }) => {
            web::run_proxy_server(&config, port.unwrap_or(config.server.proxy_port)).await
        }
        Some(Command::Plan(args)) => cmd_plan(&config, &args).await,
        None => {
            print_summary(&config, cli.config.as_ref());
            Ok(())
        }
    }
}

async fn cmd_serve(config: &TripAiConfig, port: Option<u16>) -> Result<()> {
    let client = planner::create_client(&config.planner)?;
    info!(
        "Session API using the {} planner backend",
        config.planner.backend
    );
    let controller = Arc::new(Controller::new(client));
    web::run_session_server(config, controller, port.unwrap_or(config.server.port)).await
}

/// Walk one session from the terminal: submit, list, optionally open a trip
async fn cmd_plan(config: &TripAiConfig, args: &PlanArgs) -> Result<()> {
    let preferences = PreferenceForm::from(args).collect()?;
    let client = planner::create_client(&config.planner)?;
    let controller = Controller::new(client);

    controller.start().await?;
    eprintln!(
        "Planning {} for {} traveler(s)...",
        preferences.duration(),
        preferences.travelers
    );

    let step = controller.submit(preferences).await?;
    let view = controller.view().await;
    if step != AppStep::Results {
        eprint!("{view}");
        bail!("No recommendations were generated");
    }
    print!("{view}");

    let Some(n) = args.select else {
        return Ok(());
    };

    let session = controller.snapshot().await;
    let trip = n
        .checked_sub(1)
        .and_then(|index| session.recommendations().get(index))
        .ok_or_else(|| {
            anyhow!(
                "--select {} is out of range ({} recommendations)",
                n,
                session.recommendations().len()
            )
        })?;

    eprintln!("\nBuilding the itinerary for {}...", trip.destination);
    let step = controller.select(&trip.id).await?;
    let view = controller.view().await;
    if step != AppStep::Detail {
        eprint!("{view}");
        bail!("Itinerary for {} could not be loaded", trip.destination);
    }
    println!();
    print!("{view}");
    Ok(())
}

fn print_summary(config: &TripAiConfig, explicit_path: Option<&PathBuf>) {
    let config_source = explicit_path
        .cloned()
        .or_else(|| TripAiConfig::get_config_path().filter(|p| p.exists()))
        .map_or_else(
            || "defaults and environment".to_string(),
            |p| p.display().to_string(),
        );

    println!("TripAI v{VERSION}");
    println!("Using config from: {config_source}");
    println!(
        "Planner backend: {} ({})",
        config.planner.backend,
        match config.planner.backend {
            tripai::config::PlannerBackend::Rest => config.planner.base_url.as_str(),
            tripai::config::PlannerBackend::Llm => config.planner.llm.model.as_str(),
        }
    );
    println!(
        "Session API: http://{}:{}/api/session",
        config.server.host, config.server.port
    );
    println!("Planner proxy port: {}", config.server.proxy_port);
    println!(
        "Images: {}",
        if config.planner.images.unsplash_access_key.is_some() {
            "Unsplash"
        } else {
            "placeholder"
        }
    );
    println!();
    println!("{}", presenter::render(&tripai::session::Session::new()));
    println!("Run `tripai --help` to see the available commands.");
}
