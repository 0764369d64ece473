//! Syllabus Generator Server
//!
//! Serves a course syllabus form and turns each submission into a filled
//! `.docx` document:
//!
//! - `GET /` - the HTML form
//! - `POST /generate` - fill `template.docx` and return it as a download
//! - `GET /health` - liveness check
//!
//! Every request loads its own copy of the template; the server holds no
//! mutable state between requests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod recorder;
#[cfg(test)]
mod tests;

use recorder::{FieldRecorder, FileRecorder, TracingRecorder};

/// Default template file name, looked up beside the executable
const TEMPLATE_FILE_NAME: &str = "template.docx";

/// Command-line arguments for the syllabus server
#[derive(Parser, Debug)]
#[command(name = "syllabus-server")]
#[command(about = "Fill a DOCX syllabus template from a web form")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Template document (defaults to template.docx beside the executable)
    #[arg(short, long, env = "SYLLABUS_TEMPLATE")]
    template: Option<PathBuf>,

    /// Write each request's fields to this file
    #[arg(long, env = "SYLLABUS_FIELD_DUMP")]
    field_dump: Option<PathBuf>,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Template loaded on every generate request
    pub template_path: PathBuf,
    /// Receives submitted fields for diagnostics
    pub recorder: Arc<dyn FieldRecorder>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let template_path = match args.template {
        Some(path) => path,
        None => default_template_path()?,
    };

    let recorder: Arc<dyn FieldRecorder> = match &args.field_dump {
        Some(path) => {
            info!("Recording form fields to {}", path.display());
            Arc::new(FileRecorder::new(path))
        }
        None => Arc::new(TracingRecorder),
    };

    if !template_path.exists() {
        tracing::warn!(
            "Template {} does not exist yet; /generate will return 404 until it does",
            template_path.display()
        );
    }

    let state = AppState {
        template_path: template_path.clone(),
        recorder,
    };

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let app = api::router(state).layer(GovernorLayer {
        config: governor_conf,
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Template: {}", template_path.display());
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn default_template_path() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the running executable")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?;
    Ok(dir.join(TEMPLATE_FILE_NAME))
}
