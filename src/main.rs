use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tapcard::auth::{TokenGenerator, validate_token};
use tapcard::config::{ADMIN_TOKEN_FILE_NAME, DB_FILE_NAME, ServerConfig};
use tapcard::domain::registry;
use tapcard::server::{AppState, create_router};
use tapcard::store::{SqliteStore, Store};
use tapcard::types::{Caller, Role, User};

const NOT_INITIALIZED: &str =
    "Server not initialized. Run 'tapcard admin init' first to create the database and admin token.";

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "tapcard")]
#[command(about = "Ownership and access control for NFC business card tags", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory holding the database
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// TOML config file; flags given on the command line take precedence
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, admin user and admin token)
    Init {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Register a physical tag in the unclaimed pool
    ProvisionTag {
        /// Hardware identifier read from the chip
        #[arg(long)]
        uid: String,

        /// Short code printed on the tag
        #[arg(long)]
        code: String,

        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

fn create_user_with_token(
    store: &SqliteStore,
    generator: &TokenGenerator,
    name: &str,
    role: Role,
) -> anyhow::Result<(User, String)> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        role,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user)?;

    let issued = generator.issue(&user.id, None)?;
    store.create_token(&issued.token)?;

    Ok((user, issued.raw))
}

fn print_token_banner(heading: &str, raw_token: &str) {
    println!();
    println!("========================================");
    println!("{heading}");
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();
}

fn run_init(data_dir: &Path, non_interactive: bool) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let store = SqliteStore::new(data_dir.join(DB_FILE_NAME))?;
    store.initialize()?;

    let token_file = data_dir.join(ADMIN_TOKEN_FILE_NAME);

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let (admin, raw_token) = create_user_with_token(&store, &generator, "admin", Role::Admin)?;

    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    info!(user_id = %admin.id, "created admin user");
    print_token_banner(
        "Admin token (save this, it won't be shown again):",
        &raw_token,
    );
    println!("Token also written to: {}", token_file.display());

    if !non_interactive {
        create_default_user_prompt(&store, &generator)?;
    }

    Ok(())
}

fn create_default_user_prompt(store: &SqliteStore, generator: &TokenGenerator) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a regular user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let name = inquire::Text::new("Name:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Name cannot be empty".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let (_, raw_token) = create_user_with_token(store, generator, name.trim(), Role::User)?;
    print_token_banner(&format!("Created user '{}' with token:", name.trim()), &raw_token);

    Ok(())
}

/// Opens an initialized store and resolves the admin identity from the token file.
fn open_as_admin(data_dir: &Path) -> anyhow::Result<(SqliteStore, Caller)> {
    let token_file = data_dir.join(ADMIN_TOKEN_FILE_NAME);
    if !token_file.exists() {
        bail!(NOT_INITIALIZED);
    }

    let raw_token = fs::read_to_string(&token_file)
        .with_context(|| format!("Failed to read {}", token_file.display()))?;

    let store = SqliteStore::new(data_dir.join(DB_FILE_NAME))?;
    let auth = validate_token(&store, raw_token.trim())
        .map_err(|e| anyhow::anyhow!("Admin token rejected: {e:?}"))?;

    Ok((store, auth.caller()))
}

fn run_provision_tag(data_dir: &Path, uid: &str, code: &str) -> anyhow::Result<()> {
    let (store, admin) = open_as_admin(data_dir)?;
    let tag = registry::provision(&store, &admin, uid, code)?;

    println!("Provisioned tag {} (code {})", tag.id, tag.public_code);
    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.admin_token_path();
    if !token_file.exists() {
        bail!(NOT_INITIALIZED);
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(NOT_INITIALIZED);
    }

    info!("Admin token available at {}", token_file.display());

    let state = Arc::new(AppState::new(Arc::new(store)));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tapcard=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => run_init(&data_dir, non_interactive)?,
            AdminCommands::ProvisionTag {
                uid,
                code,
                data_dir,
            } => run_provision_tag(&data_dir, &uid, &code)?,
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            config,
        } => {
            let mut server_config = match config {
                Some(path) => ServerConfig::from_file(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir;
            }

            run_serve(server_config).await?;
        }
    }

    Ok(())
}
