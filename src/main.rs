use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use condo_manager::api::{self, AppState};
use condo_manager::{
    export_database, import_database, insert_sample_data, open_database, transfer,
    version_banner, Config,
};

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve { sample: bool },
    Version,
    Export(String),
    Import(String),
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut sample = false;
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--version" | "-version" => return Ok(Command::Version),
            "--sample" | "-sample" => sample = true,
            "export" | "import" => {
                let Some(path) = rest.next() else {
                    bail!("usage: condo-manager {arg} <file.json>");
                };
                return Ok(if arg == "export" {
                    Command::Export(path.clone())
                } else {
                    Command::Import(path.clone())
                });
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Serve { sample })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let command = parse_args(&args)?;

    if command == Command::Version {
        println!("{}", version_banner());
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condo_manager=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    match command {
        Command::Serve { sample } => run_server(&config, sample).await,
        Command::Export(path) => run_export(&config, Path::new(&path)),
        Command::Import(path) => run_import(&config, Path::new(&path)),
        Command::Version => Ok(()),
    }
}

async fn run_server(config: &Config, sample: bool) -> Result<()> {
    let mut conn = open_database(&config.db_path).context("Failed to initialize database")?;

    if sample {
        match insert_sample_data(&mut conn) {
            Ok(()) => info!("Sample data loaded successfully"),
            Err(e) => warn!(error = %e, "Failed to load sample data"),
        }
    }

    let app = api::router(AppState::new(conn), config);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(%addr, "Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn run_export(config: &Config, path: &Path) -> Result<()> {
    let conn = open_database(&config.db_path).context("Failed to initialize database")?;
    let document = export_database(&conn)?;

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    transfer::write_document(BufWriter::new(file), &document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        path = %path.display(),
        residents = document.residents.len(),
        payments = document.payments.len(),
        expenses = document.expenses.len(),
        "Export written"
    );
    Ok(())
}

fn run_import(config: &Config, path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let document = transfer::read_document(BufReader::new(file))?;

    let mut conn = open_database(&config.db_path).context("Failed to initialize database")?;
    let summary = import_database(&mut conn, &document)?;

    info!(
        path = %path.display(),
        residents = summary.residents,
        payments = summary.payments,
        expenses = summary.expenses,
        "Import complete"
    );
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
