//! HotelDesk CLI - Command-line interface for the HotelDesk dashboard
//!
//! Each invocation restores the persisted session, runs one command and exits.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use hoteldesk_auth::Authorizer;
use hoteldesk_cli::Shell;
use hoteldesk_client::LoadState;
use hoteldesk_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, performance,
    HotelDeskConfig, LoggingConfig,
};
use hoteldesk_router::Route;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "hoteldesk")]
#[command(about = "Session, permission and routing shell for the HotelDesk dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session token
    Login {
        username: String,

        /// Password; prompted for when absent
        #[arg(long, env = "HOTELDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Drop the session and the persisted token
    Logout,

    /// Show the current identity and its permissions
    Whoami,

    /// Resolve a path to the view it would render
    Resolve { path: String },

    /// List the route table
    Routes,

    /// Show the sidebar entries available to the current session
    Menu,

    /// Open a path and load the data behind its view
    Fetch { path: String },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(HotelDeskConfig::default_path);

    if let Commands::Config {
        show,
        init,
        validate,
    } = cli.command
    {
        return handle_config(&config_path, show, init, validate);
    }

    let config = HotelDeskConfig::load(Some(config_path.as_path()))
        .inspect_err(|e| e.log())
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let logging_config = if cli.verbose {
        LoggingConfig {
            log_file_path: config.logging.log_file_path.clone(),
            ..LoggingConfig::verbose()
        }
    } else {
        config.logging.clone()
    };
    init_logging(&logging_config).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting HotelDesk CLI v{}", env!("CARGO_PKG_VERSION"));

    let mut shell = Shell::new(&config)?;
    if logging_config.enable_performance_monitoring {
        performance::measure_async("restore_session", shell.start()).await;
    } else {
        shell.start().await;
    }

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            handle_login(&mut shell, &username, &password).await?;
        }
        Commands::Logout => {
            shell.logout();
            println!("👋 Logged out");
        }
        Commands::Whoami => handle_whoami(&shell),
        Commands::Resolve { path } => {
            let resolution = shell.navigate(&path);
            println!("{} -> {}", resolution.path, resolution.view.title());
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::Routes => handle_routes(&shell),
        Commands::Menu => {
            for item in shell.menu() {
                println!("{:<12} {}", item.path, item.title);
            }
        }
        Commands::Fetch { path } => handle_fetch(&mut shell, &path).await?,
        // Handled before the session is restored
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn handle_login(shell: &mut Shell, username: &str, password: &str) -> anyhow::Result<()> {
    log_operation_start!("login", user = username);
    let identity = match shell.login(username, password).await {
        Ok(identity) => identity,
        Err(e) => {
            log_operation_error!("login", e, user = username);
            bail!("Login failed: {}", e);
        }
    };
    log_operation_success!("login", user = %identity.username);

    println!("✅ Logged in as {}", identity.display_string());
    Ok(())
}

fn handle_whoami(shell: &Shell) {
    match shell.store().current() {
        Some(session) => {
            println!("{}", session.identity.display_string());
            if let Some(email) = &session.identity.email {
                println!("  email: {}", email);
            }
            println!("  permissions: {}", session.permissions);
        }
        None => println!("Not logged in"),
    }
}

fn handle_routes(shell: &Shell) {
    let store = shell.store();
    for route in shell.resolver().table().routes() {
        match route {
            Route::Page {
                path,
                view,
                permission,
                ..
            } => {
                let access = match permission.as_deref() {
                    None => "open".to_string(),
                    Some(p) if store.has_permission(p) => format!("{} (granted)", p),
                    Some(p) => format!("{} (missing)", p),
                };
                println!("{:<20} {:<14} {}", path, view.title(), access);
            }
            Route::Detail { collection, .. } => {
                println!("{:<20} {:<14} open", format!("/{}/{{id}}", collection), "detail");
            }
        }
    }
}

async fn handle_fetch(shell: &mut Shell, path: &str) -> anyhow::Result<()> {
    let page = shell.open(path).await;
    println!(
        "{} -> {}",
        shell.navigator().location().pathname,
        page.resolution.view.title()
    );

    match &page.data {
        None => {}
        Some(LoadState::Loaded { data }) => println!("{}", serde_json::to_string_pretty(data)?),
        Some(LoadState::Unauthorized) => {
            println!("⚠️  Session expired, please log in again");
        }
        Some(LoadState::Failed { message, .. }) => bail!("Failed to load {}: {}", path, message),
        Some(LoadState::Loading) => {}
    }
    Ok(())
}

fn handle_config(path: &Path, show: bool, init: bool, validate: bool) -> anyhow::Result<()> {
    if init {
        if path.exists() {
            bail!("Configuration already exists at {:?}", path);
        }
        HotelDeskConfig::default().save_to_file(path)?;
        println!("✅ Configuration initialized at: {:?}", path);
    }

    if show {
        let config = HotelDeskConfig::load(Some(path))?;
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if validate {
        match HotelDeskConfig::load(Some(path)) {
            Ok(_) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("A password is required");
    }
    Ok(password)
}
