use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::error;

use analytics_session::config::{load_config, print_schema};
use analytics_session::models::{token_preview, Registration, Role};
use analytics_session::navigation::{LogNavigator, Navigator};
use analytics_session::startup::build_state;
use analytics_session::utils::logger::init_logging;
use analytics_session::Result;

#[derive(Parser)]
#[command(name = "analytics-session")]
#[command(about = "Session and request client for the student analytics API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "./config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved environment and API base address
    Env,

    /// Print the configuration JSON schema
    Schema,

    /// Sign in and persist the session
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        username: String,

        email: String,

        #[arg(short, long)]
        password: String,

        /// admin, user or viewer
        #[arg(short, long, default_value = "user")]
        role: Role,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Fetch the signed-in user's profile from the server
    Profile,

    /// Show the locally persisted session
    Whoami,

    /// Authenticated GET against an API path
    Get { path: String },

    /// Run a view transition through the navigation guard
    Navigate { path: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Schema = cli.command {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Arc<analytics_session::config::ConfigV1>) -> Result<()> {
    let navigator = Arc::new(LogNavigator::new());
    let state = build_state(config, navigator.clone() as Arc<dyn Navigator>)?;

    match command {
        Commands::Env => {
            println!("environment: {}", state.environment.environment);
            println!("api_base_url: {}", state.environment.api_base_url);
        }
        Commands::Schema => {}
        Commands::Login { username, password } => {
            let session = state.session.login(&username, &password).await?;
            println!(
                "signed in as {} ({}), token {}",
                session.username,
                session.role,
                token_preview(&session.token)
            );
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => {
            let registration = Registration::new(&username, &email, &password).with_role(role);
            let message = state.session.register(&registration).await?;
            println!("{}", message);
        }
        Commands::Logout => {
            state.session.logout().await;
            println!("signed out");
        }
        Commands::Profile => {
            let profile = state.session.get_profile().await?;
            print_json(&serde_json::to_value(&profile).map_err(decode_error)?)?;
        }
        Commands::Whoami => match state.session.current_user() {
            Some(session) => println!("{} ({})", session.username, session.role),
            None => println!("not signed in"),
        },
        Commands::Get { path } => {
            let response = state.http.get(&path).await?;
            if response.is_json() {
                print_json(&response.into_json()?)?;
            } else if let Some(raw) = response.into_raw() {
                let bytes = raw.bytes().await?;
                println!("<{} bytes of non-JSON content>", bytes.len());
            }
        }
        Commands::Navigate { path } => {
            let landed = state.router.navigate(&path);
            println!("{}", landed);
            if let Some(title) = navigator.title() {
                println!("title: {}", title);
            }
        }
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).map_err(decode_error)?);
    Ok(())
}

fn decode_error(e: serde_json::Error) -> analytics_session::Error {
    analytics_session::Error::Decode(e.to_string())
}
