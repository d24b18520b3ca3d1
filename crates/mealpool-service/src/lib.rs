//! REST surface for the meal funding pool.
//!
//! The service owns one [`FundingPool`] behind a mutex, which serializes all
//! mutating operations exactly as the ledger's execution model requires.
//! Caller identity arrives in each request body; key management and signing
//! are the deployment environment's concern, not this service's.

#![deny(unsafe_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mealpool_adapters::MemorySettlement;
use mealpool_core::{
    AccountId, DayClock, ErrorCategory, FundingPool, JournalEntry, ManualDayClock, PoolConfig,
    PoolError, SettlementReceipt, UtcDayClock, DEFAULT_DAILY_LIMIT, SECONDS_PER_DAY,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Service construction options.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub owner: AccountId,
    pub daily_limit: u64,
    pub day_length_secs: u64,
    /// Drive the epoch day manually instead of from UTC. Used by tests and
    /// local simulations.
    pub manual_clock: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::new("owner"),
            daily_limit: DEFAULT_DAILY_LIMIT,
            day_length_secs: SECONDS_PER_DAY,
            manual_clock: false,
        }
    }
}

/// Shared service state: the pool, its settlement rail, and the clock handle.
#[derive(Clone)]
pub struct ServiceState {
    pub pool: Arc<Mutex<FundingPool>>,
    pub rail: Arc<MemorySettlement>,
    manual_clock: Option<ManualDayClock>,
}

impl ServiceState {
    pub fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        let rail = Arc::new(MemorySettlement::new());

        let (clock, manual_clock): (Arc<dyn DayClock>, Option<ManualDayClock>) =
            if config.manual_clock {
                let manual = ManualDayClock::new(0);
                (Arc::new(manual.clone()), Some(manual))
            } else {
                (Arc::new(UtcDayClock::new(config.day_length_secs)), None)
            };

        let pool = FundingPool::new(
            config.owner,
            PoolConfig {
                daily_limit: config.daily_limit,
            },
            clock,
            rail.clone(),
        )?;

        Ok(Self {
            pool: Arc::new(Mutex::new(pool)),
            rail,
            manual_clock,
        })
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/pool", get(pool_status))
        .route("/v1/fund", post(fund))
        .route("/v1/recipients/approve", post(approve_recipient))
        .route("/v1/recipients/revoke", post(revoke_recipient))
        .route("/v1/disburse", post(request_disbursement))
        .route("/v1/pause", post(pause))
        .route("/v1/unpause", post(unpause))
        .route("/v1/limit", post(update_daily_limit))
        .route("/v1/emergency-withdraw", post(emergency_withdraw))
        .route("/v1/accounts/:id", get(account_status))
        .route("/v1/events", get(list_events))
        .route("/v1/clock/advance", post(advance_clock))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
}

/// API error envelope carrying the pool's stable reason code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Pool(PoolError),
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        Self::Pool(err)
    }
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

fn pool_error_status(err: &PoolError) -> StatusCode {
    match err.category() {
        ErrorCategory::Unauthorized => StatusCode::FORBIDDEN,
        ErrorCategory::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCategory::StateConflict => StatusCode::CONFLICT,
        ErrorCategory::ResourceExhausted => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Pool(err) => (
                pool_error_status(&err),
                Json(serde_json::json!({
                    "error": err.to_string(),
                    "reason": err.reason_code(),
                })),
            )
                .into_response(),
            ApiError::Http { status, message } => {
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "mealpool-service",
    })
}

#[derive(Debug, Clone, Serialize)]
struct PoolStatusResponse {
    owner: AccountId,
    paused: bool,
    daily_limit: u64,
    total_funds: u64,
    contract_balance: u64,
    journal_len: usize,
    journal_verified: bool,
}

async fn pool_status(State(state): State<ServiceState>) -> Json<PoolStatusResponse> {
    let pool = state.pool.lock().await;
    Json(PoolStatusResponse {
        owner: pool.owner().clone(),
        paused: pool.is_paused(),
        daily_limit: pool.daily_limit(),
        total_funds: pool.total_funds(),
        contract_balance: pool.get_contract_balance(),
        journal_len: pool.events().len(),
        journal_verified: pool.verify_journal(),
    })
}

#[derive(Debug, Clone, Deserialize)]
struct FundRequest {
    caller: AccountId,
    amount: u64,
}

#[derive(Debug, Clone, Serialize)]
struct FundResponse {
    depositor: AccountId,
    amount: u64,
    new_balance: u64,
    total_funds: u64,
}

async fn fund(
    State(state): State<ServiceState>,
    Json(request): Json<FundRequest>,
) -> Result<Json<FundResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    let new_balance = pool.fund(&request.caller, request.amount)?;
    info!(
        depositor = %request.caller,
        amount = request.amount,
        new_balance,
        "deposit accepted"
    );
    Ok(Json(FundResponse {
        depositor: request.caller,
        amount: request.amount,
        new_balance,
        total_funds: pool.total_funds(),
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct RecipientRequest {
    caller: AccountId,
    recipient: AccountId,
}

#[derive(Debug, Clone, Serialize)]
struct RecipientResponse {
    recipient: AccountId,
    approved: bool,
}

async fn approve_recipient(
    State(state): State<ServiceState>,
    Json(request): Json<RecipientRequest>,
) -> Result<Json<RecipientResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    pool.approve_recipient(&request.caller, &request.recipient)?;
    info!(recipient = %request.recipient, "recipient approved");
    Ok(Json(RecipientResponse {
        recipient: request.recipient,
        approved: true,
    }))
}

async fn revoke_recipient(
    State(state): State<ServiceState>,
    Json(request): Json<RecipientRequest>,
) -> Result<Json<RecipientResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    pool.revoke_recipient(&request.caller, &request.recipient)?;
    info!(recipient = %request.recipient, "recipient revoked");
    Ok(Json(RecipientResponse {
        recipient: request.recipient,
        approved: false,
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct DisburseRequest {
    caller: AccountId,
    amount: u64,
}

#[derive(Debug, Clone, Serialize)]
struct DisburseResponse {
    receipt: SettlementReceipt,
    total_funds: u64,
    remaining_daily_allowance: u64,
}

async fn request_disbursement(
    State(state): State<ServiceState>,
    Json(request): Json<DisburseRequest>,
) -> Result<Json<DisburseResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    let receipt = pool.request_disbursement(&request.caller, request.amount)?;
    info!(
        recipient = %request.caller,
        amount = request.amount,
        total_funds = pool.total_funds(),
        "disbursement settled"
    );
    let remaining = pool.get_remaining_daily_allowance(&request.caller);
    Ok(Json(DisburseResponse {
        receipt,
        total_funds: pool.total_funds(),
        remaining_daily_allowance: remaining,
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct AdminRequest {
    caller: AccountId,
}

#[derive(Debug, Clone, Serialize)]
struct PausedResponse {
    paused: bool,
}

async fn pause(
    State(state): State<ServiceState>,
    Json(request): Json<AdminRequest>,
) -> Result<Json<PausedResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    pool.pause(&request.caller)?;
    info!("pool paused");
    Ok(Json(PausedResponse { paused: true }))
}

async fn unpause(
    State(state): State<ServiceState>,
    Json(request): Json<AdminRequest>,
) -> Result<Json<PausedResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    pool.unpause(&request.caller)?;
    info!("pool unpaused");
    Ok(Json(PausedResponse { paused: false }))
}

#[derive(Debug, Clone, Deserialize)]
struct LimitRequest {
    caller: AccountId,
    new_limit: u64,
}

#[derive(Debug, Clone, Serialize)]
struct LimitResponse {
    daily_limit: u64,
}

async fn update_daily_limit(
    State(state): State<ServiceState>,
    Json(request): Json<LimitRequest>,
) -> Result<Json<LimitResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    pool.update_daily_limit(&request.caller, request.new_limit)?;
    info!(new_limit = request.new_limit, "daily limit updated");
    Ok(Json(LimitResponse {
        daily_limit: pool.daily_limit(),
    }))
}

#[derive(Debug, Clone, Serialize)]
struct EmergencyResponse {
    receipt: SettlementReceipt,
    total_funds: u64,
}

async fn emergency_withdraw(
    State(state): State<ServiceState>,
    Json(request): Json<AdminRequest>,
) -> Result<Json<EmergencyResponse>, ApiError> {
    let mut pool = state.pool.lock().await;
    let receipt = pool.emergency_withdraw(&request.caller)?;
    info!(amount = receipt.amount, "emergency withdrawal settled");
    Ok(Json(EmergencyResponse {
        receipt,
        total_funds: pool.total_funds(),
    }))
}

#[derive(Debug, Clone, Serialize)]
struct AccountStatusResponse {
    account: AccountId,
    funder_balance: u64,
    approved: bool,
    remaining_daily_allowance: u64,
    settled_credits: u64,
}

async fn account_status(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Json<AccountStatusResponse> {
    let account = AccountId::new(id);
    let pool = state.pool.lock().await;
    Json(AccountStatusResponse {
        funder_balance: pool.funder_balance(&account),
        approved: pool.is_approved(&account),
        remaining_daily_allowance: pool.get_remaining_daily_allowance(&account),
        settled_credits: state.rail.credited(&account),
        account,
    })
}

#[derive(Debug, Clone, Serialize)]
struct EventsResponse {
    total: usize,
    verified: bool,
    items: Vec<JournalEntry>,
}

async fn list_events(State(state): State<ServiceState>) -> Json<EventsResponse> {
    let pool = state.pool.lock().await;
    Json(EventsResponse {
        total: pool.events().len(),
        verified: pool.verify_journal(),
        items: pool.events().to_vec(),
    })
}

#[derive(Debug, Clone, Deserialize)]
struct AdvanceClockRequest {
    days: u64,
}

#[derive(Debug, Clone, Serialize)]
struct AdvanceClockResponse {
    current_day: u64,
}

/// Only available when the service was started with a manual clock.
async fn advance_clock(
    State(state): State<ServiceState>,
    Json(request): Json<AdvanceClockRequest>,
) -> Result<Json<AdvanceClockResponse>, ApiError> {
    let clock = state
        .manual_clock
        .as_ref()
        .ok_or_else(|| ApiError::not_found("service is not running a manual clock"))?;
    clock.advance_days(request.days);
    Ok(Json(AdvanceClockResponse {
        current_day: clock.current_day(),
    }))
}
