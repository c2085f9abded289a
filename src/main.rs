use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use planetrack_api::AppState;
use planetrack_auth::{ClientCredentials, OAuth2Client};
use planetrack_config::{Config, LogFormat};
use planetrack_normalize::AirportNormalizer;
use planetrack_provider::{AirportDbCredentials, AirportInfoGateway, StateVectorGateway};
use planetrack_store::{InMemoryAirportRepository, InMemoryTokenStore, SqliteAirportRepository};
use planetrack_types::AirportRepository;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(
    name = "planetrack",
    version,
    about = "planetrack: live flights and airports from OpenSky and AirportDB"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 8000).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
        /// SQLite database holding stored airports.
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
    /// Fetch an OpenSky access token and show its type and lifetime.
    Token {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Fetch one airport from AirportDB and print it normalized.
    Airport {
        /// ICAO identifier, e.g. KJFK.
        icao: String,
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Also store the record in this SQLite database.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            host,
            db,
        } => cmd_serve(config, port, host, db).await,
        Commands::Token { config } => cmd_token(config).await,
        Commands::Airport { icao, config, save } => cmd_airport(icao, config, save).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = Config::load(path.map(PathBuf::as_path))
        .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    config.validate()?;
    init_tracing(&config);
    Ok(config)
}

/// `RUST_LOG` wins over `log.level` when set.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    Ok(planetrack_provider::build_client(Duration::from_secs(
        config.http.timeout_secs,
    ))?)
}

fn oauth_client(config: &Config, http: reqwest::Client) -> OAuth2Client {
    let opensky = &config.opensky;
    let credentials = ClientCredentials::new(
        opensky.client_id.clone(),
        opensky.client_secret.clone(),
        opensky.token_url.clone(),
    );
    OAuth2Client::new(credentials, Arc::new(InMemoryTokenStore::new()), http)
        .with_expiry_margin(opensky.expiry_margin_secs)
        .with_missing_expiry(opensky.missing_expiry)
}

fn airport_gateway(config: &Config, http: reqwest::Client) -> AirportInfoGateway {
    AirportInfoGateway::new(
        http,
        AirportDbCredentials::new(
            config.airportdb.api_token.clone(),
            config.airportdb.base_url.clone(),
        ),
    )
}

async fn open_repository(path: Option<&str>) -> Result<Arc<dyn AirportRepository>> {
    let Some(path) = path else {
        tracing::info!("no database configured, airports are kept in memory");
        return Ok(Arc::new(InMemoryAirportRepository::new()));
    };
    let url = if path.starts_with("sqlite:") {
        path.to_owned()
    } else {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        format!("sqlite://{path}")
    };
    let repo = SqliteAirportRepository::new(&url)
        .await
        .map_err(|e| anyhow::anyhow!("database error: {e}"))?;
    tracing::info!(database = %path, "airport repository opened");
    Ok(Arc::new(repo))
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
    db: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path.as_ref())?;

    if let Some(p) = port {
        config.port = p;
    }
    if let Some(h) = host {
        config.host = h;
    }
    if let Some(db) = db {
        config.database = Some(db.display().to_string());
    }

    let http = http_client(&config)?;
    let auth = Arc::new(oauth_client(&config, http.clone()));
    let state = Arc::new(AppState {
        states: Arc::new(StateVectorGateway::new(
            auth,
            config.opensky.api_base_url.clone(),
        )),
        airports: Arc::new(airport_gateway(&config, http)),
        repository: open_repository(config.database.as_deref()).await?,
    });
    let app = planetrack_api::make_router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(address = %addr, "planetrack listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cmd_token(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let client = oauth_client(&config, http_client(&config)?);
    let token = client
        .fetch_token()
        .await
        .map_err(|e| anyhow::anyhow!("token request failed: {e}"))?;

    println!("token_type: {}", token.token_type);
    match token.expires_in {
        Some(secs) => println!("expires_in: {secs}s"),
        None => println!("expires_in: (not provided)"),
    }
    if let Some(at) = token.expires_at {
        println!("expires_at: {at}");
    }
    Ok(())
}

async fn cmd_airport(
    icao: String,
    config_path: Option<PathBuf>,
    save: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let gateway = airport_gateway(&config, http_client(&config)?);
    let raw = gateway
        .get_airport_data(&icao)
        .await
        .map_err(|e| anyhow::anyhow!("airport request failed: {e}"))?;
    let record = AirportNormalizer::normalize(raw)?;

    if let Some(path) = save {
        let db = path.display().to_string();
        let repo = open_repository(Some(db.as_str())).await?;
        repo.upsert(&record).await?;
        eprintln!("{} stored in {}", record.identifier, path.display());
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
