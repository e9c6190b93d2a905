use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::CONFIG;
use crate::engine;
use crate::engine::pairing::PairingDetector;
use crate::engine::types::{Diagnostic, EngineReport, Pairing, WalletSnapshot};
use crate::server::AppState;

/// Response for the pairings-only endpoint
#[derive(Debug, Serialize)]
pub struct PairingReportResponse {
    pub wallet: String,
    pub pairings: Vec<Pairing>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Request for what-if simulation on a caller-supplied snapshot
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub snapshot: WalletSnapshot,
    pub pairs_per_pool: Option<usize>,
    pub reference_lp_share: Option<f64>,
}

/// Full portfolio report for a wallet: assemble the snapshot from all
/// readers, run the engine once, return the result.
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<ResponseJson<EngineReport>, (StatusCode, String)> {
    info!(wallet, "portfolio report requested");

    let snapshot = state.assembler.assemble(&wallet).await.map_err(|e| {
        error!(wallet, error = %e, "snapshot assembly failed");
        (StatusCode::BAD_GATEWAY, format!("Failed to assemble snapshot: {}", e))
    })?;

    let report = engine::run(&snapshot, &CONFIG.engine.params());
    Ok(ResponseJson(report))
}

/// Pairing report only: which heroes are questing together, in which
/// role, and with what confidence source.
pub async fn get_pairings(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<ResponseJson<PairingReportResponse>, (StatusCode, String)> {
    info!(wallet, "pairing report requested");

    let snapshot = state.assembler.assemble(&wallet).await.map_err(|e| {
        error!(wallet, error = %e, "snapshot assembly failed");
        (StatusCode::BAD_GATEWAY, format!("Failed to assemble snapshot: {}", e))
    })?;

    let mut diagnostics = Vec::new();
    let pairings = PairingDetector::new().detect(&snapshot, &mut diagnostics);

    Ok(ResponseJson(PairingReportResponse {
        wallet,
        pairings,
        diagnostics,
    }))
}

/// Run the engine on a caller-supplied snapshot (what-if mode). No reads
/// are issued; pools without an LP position use the reference share.
pub async fn simulate(
    axum::extract::Json(request): axum::extract::Json<SimulateRequest>,
) -> Result<ResponseJson<EngineReport>, (StatusCode, String)> {
    info!(
        wallet = %request.snapshot.wallet,
        heroes = request.snapshot.heroes.len(),
        "simulation requested"
    );

    if request.snapshot.heroes.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Snapshot contains no heroes".to_string(),
        ));
    }

    let mut params = CONFIG.engine.params();
    if let Some(pairs) = request.pairs_per_pool {
        params.pairs_per_pool = pairs;
    }
    if let Some(share) = request.reference_lp_share {
        params.reference_lp_share = share;
    }

    let report = engine::run(&request.snapshot, &params);
    Ok(ResponseJson(report))
}

/// Create garden routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/garden/portfolio/{wallet}", get(get_portfolio))
        .route("/api/v1/garden/pairings/{wallet}", get(get_pairings))
        .route("/api/v1/garden/simulate", post(simulate))
}
