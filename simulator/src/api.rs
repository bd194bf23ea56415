//! HTTP surface for hosts: `POST /simulate` runs a batch and, when the
//! measured edge misses the target band, runs the balancing loop before
//! responding.

use axum::{
    extract::State as AxumState,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use drawhouse_engine::EngineError;
use drawhouse_types::{
    BatchReport, OptimizationObjective, OptimizationResult, SimulationConfig,
    HIGH_EDGE_THRESHOLD, LOW_EDGE_THRESHOLD,
};

use crate::{AutoBalancer, Simulator};

#[derive(Clone)]
pub struct ApiState {
    pub config: SimulationConfig,
    pub rounds: u64,
    pub seed: u64,
}

pub struct Api {
    state: ApiState,
}

/// Response for `/simulate`: the batch report plus, when the edge left the
/// target band, the balancing result.
#[derive(Serialize)]
pub struct SimulateResponse {
    pub report: BatchReport,
    pub balanced: Option<OptimizationResult>,
}

impl Api {
    pub fn new(state: ApiState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/simulate", post(simulate))
            .route("/healthz", get(healthz))
            .layer(cors)
            .with_state(self.state.clone())
    }
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// Run one batch. An optional JSON body overrides the server's default
/// configuration for this request only.
async fn simulate(
    AxumState(state): AxumState<ApiState>,
    body: Option<Json<SimulationConfig>>,
) -> impl IntoResponse {
    let config = body.map(|Json(c)| c).unwrap_or_else(|| state.config.clone());
    let rounds = state.rounds;
    let seed = state.seed;

    // The simulation is CPU-bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || run_simulation(config, rounds, seed)).await;

    match result {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(e)) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

fn run_simulation(
    config: SimulationConfig,
    rounds: u64,
    seed: u64,
) -> Result<SimulateResponse, EngineError> {
    let simulator = Simulator::new(config.clone(), seed);
    let report: BatchReport = simulator.run(rounds)?;
    let edge = report.analysis.house_edge;
    let balanced = if (LOW_EDGE_THRESHOLD..=HIGH_EDGE_THRESHOLD).contains(&edge) {
        None
    } else {
        let balancer = AutoBalancer::new(OptimizationObjective::default())
            .with_rounds_per_batch(rounds.min(10_000));
        Some(balancer.run(config, seed)?)
    };
    Ok(SimulateResponse { report, balanced })
}
