use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use eventflow::backend::{
    LogNotifier, MemoryArtistRepository, MemoryPortfolioStorage, ResendMailer, SupabaseClient,
};
use eventflow::config::AppConfig;
use eventflow::error::AppError;
use eventflow::telemetry;
use eventflow::workflows::artist::{
    artist_router, storage, ApplicationWizard, ApprovalOutcome, ArtistApplicationService,
    AttachmentUpload, ExperienceLevel, MemoryKeyValueStore, NotificationStatus, PerformanceType,
    PortfolioLink, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "EventFlow",
    about = "Run the EventFlow artist application service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a sample artist application through the wizard and review flow
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(build_artist_router(&config)?)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "eventflow artist application service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Wire the workflow router against whatever collaborators the environment
/// provides: Supabase and Resend when configured, process-local fallbacks
/// otherwise.
fn build_artist_router(config: &AppConfig) -> Result<Router, AppError> {
    let router = match (&config.supabase, &config.email) {
        (Some(supabase), Some(email)) => {
            let repository = Arc::new(SupabaseClient::new(supabase)?);
            let notifier = Arc::new(ResendMailer::new(email)?);
            artist_router(Arc::new(ArtistApplicationService::new(
                repository, notifier,
            )))
        }
        (Some(supabase), None) => {
            let repository = Arc::new(SupabaseClient::new(supabase)?);
            let notifier = Arc::new(LogNotifier);
            artist_router(Arc::new(ArtistApplicationService::new(
                repository, notifier,
            )))
        }
        (None, Some(email)) => {
            let repository = Arc::new(MemoryArtistRepository::default());
            let notifier = Arc::new(ResendMailer::new(email)?);
            artist_router(Arc::new(ArtistApplicationService::new(
                repository, notifier,
            )))
        }
        (None, None) => {
            let repository = Arc::new(MemoryArtistRepository::default());
            let notifier = Arc::new(LogNotifier);
            artist_router(Arc::new(ArtistApplicationService::new(
                repository, notifier,
            )))
        }
    };
    Ok(router)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo() -> Result<(), AppError> {
    let repository = Arc::new(MemoryArtistRepository::default());
    let notifier = Arc::new(LogNotifier);
    let service = ArtistApplicationService::new(repository, notifier);
    let storage = MemoryPortfolioStorage::default();

    let artist = UserId("demo-artist".to_string());
    let today = Local::now().date_naive();
    let mut wizard = ApplicationWizard::new(MemoryKeyValueStore::default());

    println!("Artist application demo");
    println!("Step {} of 6: personal information", wizard.current_step());
    wizard.edit("identity", |draft| {
        draft.identity.first_name = "Nova".to_string();
        draft.identity.last_name = "Reyes".to_string();
        draft.identity.stage_name = "Nova R".to_string();
        draft.identity.email = "nova@example.com".to_string();
        draft.identity.phone = "555-0170".to_string();
        draft.identity.address = "12 Canal St".to_string();
        draft.identity.city = "Portland".to_string();
        draft.identity.state = "OR".to_string();
        draft.identity.zip_code = "97209".to_string();
        draft.identity.country = "US".to_string();
        draft.identity.date_of_birth = "1994-04-12".to_string();
    })?;
    wizard.next(today)?;

    println!("Step {} of 6: musical background", wizard.current_step());
    wizard.edit("background", |draft| {
        draft.background.primary_genre = "Electronic".to_string();
        draft.background.primary_instrument = "Synthesizer".to_string();
        draft.background.experience_level = Some(ExperienceLevel::Professional);
        draft.background.performance_type = Some(PerformanceType::Solo);
        draft.background.years_of_experience = Some(9);
        draft.background.performance_experience = vec!["Festivals".to_string()];
    })?;
    wizard.next(today)?;

    println!("Step {} of 6: portfolio", wizard.current_step());
    wizard.edit("portfolioLinks", |draft| {
        draft.portfolio_links.push(PortfolioLink {
            platform: "SoundCloud".to_string(),
            url: "https://soundcloud.com/nova-r".to_string(),
            description: "Latest sets".to_string(),
        });
    })?;
    wizard.next(today)?;

    println!("Step {} of 6: about you", wizard.current_step());
    wizard.edit("narrative", |draft| {
        draft.narrative.bio = "Nova R is an electronic artist blending modular synthesis with \
            field recordings, performing across the festival circuit for nearly a decade."
            .to_string();
        draft.narrative.artist_statement =
            "I build immersive sets that turn a crowd into a single instrument.".to_string();
    })?;
    wizard.next(today)?;

    println!("Step {} of 6: attachments", wizard.current_step());
    wizard.attach(
        &storage,
        &artist,
        AttachmentUpload {
            name: "demo-set.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            bytes: vec![0; 2048],
        },
    )?;
    for attachment in &wizard.draft().attachments {
        println!(
            "- {} ({})",
            attachment.name,
            storage::category_label(&attachment.content_type)
        );
    }
    wizard.next(today)?;

    println!("Step {} of 6: review and submit", wizard.current_step());
    let completion = wizard.completion();
    println!(
        "Checklist: {}/{} required, {}/{} optional",
        completion.required, completion.total_required, completion.optional, completion.total_optional
    );

    let submitted = wizard.submit(&service, &artist)?;
    println!(
        "\nSubmitted application {} (status: {})",
        submitted.id.0,
        submitted.status.label()
    );

    let reviewer = UserId("demo-admin".to_string());
    let ApprovalOutcome {
        application,
        profile,
        notification,
    } = service.approve(&submitted.id, &reviewer)?;

    println!("\nReview outcome");
    println!("- status: {}", application.status.label());
    println!("- profile created for: {}", profile.stage_name);
    println!("- genres: {}", profile.genres.join(", "));
    match notification {
        NotificationStatus::Sent => println!("- applicant notified"),
        NotificationStatus::Failed(reason) => println!("- notification failed: {reason}"),
    }

    Ok(())
}
