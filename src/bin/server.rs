use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use box_packer::config::PackOptions;
use box_packer::export::Stats;
use box_packer::job::Job;
use box_packer::solver::Packer;
use box_packer::types::PlacementRecord;
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Multiple of the warning budget after which the request is answered with a
/// timeout, whatever the search is doing.
const HARD_DEADLINE_FACTOR: u32 = 3;
const HARD_DEADLINE_SLACK: Duration = Duration::from_secs(1);

/// Largest warning budget a request may ask for. A timed-out search keeps its
/// blocking thread, so long budgets would let a few requests hold them all.
const MAX_BUDGET_MS: u64 = 30_000;

#[derive(Debug, Serialize)]
struct PackResponse {
    feasible: bool,
    placements: Vec<PlacementRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
}

async fn pack(Json(job): Json<Job>) -> Result<Json<PackResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&job).unwrap_or_default(),
        "POST /pack"
    );

    if let Some(ms) = job.budget_ms.filter(|&ms| ms > MAX_BUDGET_MS) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("budget_ms {ms} exceeds the limit of {MAX_BUDGET_MS}"),
        ));
    }

    let bad_request = |e: box_packer::error::PackError| (StatusCode::BAD_REQUEST, e.to_string());
    let container = job.container().map_err(bad_request)?;
    let items = job.items().map_err(bad_request)?;
    let options = job.options(PackOptions::default()).map_err(bad_request)?;
    options.check_unit_count(&items).map_err(bad_request)?;

    let deadline = options
        .warning_budget
        .saturating_mul(HARD_DEADLINE_FACTOR)
        .saturating_add(HARD_DEADLINE_SLACK);
    let search = tokio::task::spawn_blocking(move || {
        let mut packer = Packer::new(container, options);
        let feasible = packer.pack(&items);
        let mut placements = packer.placements().to_vec();
        placements.sort_by_key(|r| r.item_index);
        (feasible, placements)
    });

    // the blocking task keeps running after a timeout, its result is dropped
    let (feasible, placements) = match tokio::time::timeout(deadline, search).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "packing task failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "packing failed".to_string()));
        }
        Err(_) => {
            tracing::warn!(?deadline, "packing exceeded deadline");
            return Err((
                StatusCode::GATEWAY_TIMEOUT,
                format!("packing did not finish within {:?}", deadline),
            ));
        }
    };

    let stats = feasible.then(|| Stats::compute(container, &placements));
    Ok(Json(PackResponse {
        feasible,
        placements,
        stats,
    }))
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() {
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}

async fn serve() {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await.unwrap();
}
