//! `headtrack` - machine-head inventory server and CLI
//!
//! This binary runs the inventory web server and provides command-line
//! access to the store status, spreadsheet export, and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use headtrack::cli::{Cli, Command, ConfigCommand, ExportCommand};
use headtrack::{export, init_logging, server, Config, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => {
            if let Some(port) = cmd.port {
                config.server.port = port;
            }
            if let Some(bind) = cmd.bind {
                config.server.bind_address = bind;
            }
            config.validate()?;
            server::serve(&config).await?;
        }
        Command::Status(cmd) => handle_status(&config, cmd.json)?,
        Command::Export(cmd) => handle_export(&config, &cmd)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(config.database_path())?;
    let total = store.count();

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "credentials_path": config.credentials_path(),
            "total_entries": total,
            "listen_address": config.listen_addr()?.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("headtrack status");
        println!("----------------");
        println!("Database:      {}", config.database_path().display());
        println!("Credentials:   {}", config.credentials_path().display());
        println!("Total entries: {total}");
        println!("Listen on:     {}", config.listen_addr()?);
    }
    Ok(())
}

fn handle_export(
    config: &Config,
    cmd: &ExportCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(config.database_path())?;
    let records = store.load();

    let output = cmd
        .output
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from(export::EXPORT_FILE_NAME));
    export::write_to_file(&records, &output)?;

    println!("Exported {} records to {}", records.len(), output.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:  {}", config.server.bind_address);
                println!("  Port:          {}", config.server.port);
                println!(
                    "  Cookie secret: {}",
                    if config.server.cookie_secret.is_some() {
                        "configured"
                    } else {
                        "generated per run"
                    }
                );
                println!();
                println!("[Storage]");
                println!("  Database:      {}", config.database_path().display());
                println!("  Credentials:   {}", config.credentials_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
