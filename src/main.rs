mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;

use anyhow::Context;
use clap::Parser;
use cli::{menu_command, App, Cli, MENU_ITEMS};
use colored::*;
use config::Settings;
use dialoguer::{theme::ColorfulTheme, Select};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up stderr logging (filtered by `RUST_LOG`, default `warn`) and, when a log directory
/// is configured, a daily-rolling JSON log file at info level.
fn init_logging(settings: &Settings) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    );

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tracker-cli.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().context("Failed to load settings")?;
    let _log_guard = init_logging(&settings);

    if cli.no_colors {
        colored::control::set_override(false);
    }

    info!("Initializing tracker CLI...");

    let app = match App::connect(settings).await {
        Ok(app) => {
            info!("Application initialized successfully.");
            app
        },
        Err(e) => {
            error!("Failed to initialize application: {:?}", e);
            println!(
                "{}",
                "Error: Failed to initialize application. Check logs.".red()
            );
            return Err(e).context("Failed to initialize application");
        },
    };

    // One-shot mode
    if let Some(command) = cli.command.clone() {
        let mut ctx = app.context(&cli);
        app.run_command(command, &mut ctx)
            .await
            .context("Command failed")?;
        return Ok(());
    }

    println!("{}", "Welcome to the Tracker CLI!".cyan().bold());

    // Main interactive loop
    loop {
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&MENU_ITEMS)
            .default(0)
            .interact_opt()? // None on Esc/q
            .unwrap_or(MENU_ITEMS.len() - 1); // Default to Exit if cancelled

        println!("\n---\n");

        let command = match menu_command(selection) {
            Ok(Some(command)) => command,
            Ok(None) => {
                println!("{}", "Exiting. Goodbye!".green());
                break;
            },
            Err(e) => {
                println!("{} {}", "Failed to get input:".red(), e);
                continue;
            },
        };

        // Every run starts from the command-line input, without a previously selected project.
        let mut ctx = app.context(&cli);
        if let Err(e) = app.run_command(command, &mut ctx).await {
            error!("Command execution failed: {:?}", e);
            println!(
                "{} {}",
                "Error executing command:".red(),
                e.to_string().red()
            );
        }

        println!("\n---\n");
    }

    Ok(())
}
