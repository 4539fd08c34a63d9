//! # API REST
//!
//! REST API implementation for the medication label system.
//!
//! Handles:
//! - HTTP endpoints with axum (catalog, patient search, login, basket CRUD,
//!   the remote audit sink endpoint)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! The wire format is camelCase JSON. Domain logic lives in
//! `medilabel-core`; handlers here translate between wire types and core
//! types and map errors to status codes.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use chrono::Utc;
use medilabel_core::{
    AuditLedger, AuditRecord, AuthService, BasketError, BasketLine, BasketStore, CatalogStore,
    CoreConfig, PatientDirectory, StoreResult,
};

/// Application state shared across request handlers.
///
/// The read-only stores are loaded once at startup; the basket is the single
/// active operator's working set and the ledger is the durable store behind
/// the audit endpoint.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<CatalogStore>,
    directory: Arc<PatientDirectory>,
    auth: Arc<AuthService>,
    basket: Arc<RwLock<BasketStore>>,
    ledger: Arc<AuditLedger>,
}

impl AppState {
    /// Load every store from the configured data directory.
    pub fn load(cfg: &CoreConfig) -> StoreResult<Self> {
        Ok(Self {
            catalog: Arc::new(CatalogStore::load(&cfg.catalog_path())?),
            directory: Arc::new(PatientDirectory::load(&cfg.patients_path())?),
            auth: Arc::new(AuthService::load(&cfg.users_path())?),
            basket: Arc::new(RwLock::new(BasketStore::new())),
            ledger: Arc::new(AuditLedger::new(cfg.audit_ledger_path())),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_medications,
        search_patient,
        login,
        add_to_basket,
        get_basket,
        remove_from_basket,
        clear_basket,
        record_audit,
    ),
    components(schemas(
        HealthRes,
        MedicationRes,
        ListMedicationsRes,
        PatientRes,
        LoginReq,
        LoginRes,
        AddBasketReq,
        AddBasketRes,
        BasketLineRes,
        ListBasketRes,
        AuditReq,
        AuditRes,
    ))
)]
struct ApiDoc;

/// Build the application router with all routes, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/medications", get(list_medications))
        .route("/api/patients/search", get(search_patient))
        .route("/api/auth/login", post(login))
        .route("/api/basket/add", post(add_to_basket))
        .route("/api/basket", get(get_basket))
        .route("/api/basket/:id", delete(remove_from_basket))
        .route("/api/basket", delete(clear_basket))
        .route("/api/audit", post(record_audit))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Wire types

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRes {
    pub drug_name: String,
    pub instruction: String,
    pub barcode: Option<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ListMedicationsRes {
    pub medications: Vec<MedicationRes>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    pub patient_id: u32,
    pub year: u16,
    pub patient_name: String,
    pub national_id: String,
    pub full_id: String,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRes {
    pub user_id: u32,
    pub username: String,
    pub full_name: String,
    pub access_level: String,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBasketReq {
    pub drug_name: String,
    #[serde(default)]
    pub instruction_text: Option<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct AddBasketRes {
    pub id: u64,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasketLineRes {
    pub id: u64,
    pub drug_name: String,
    pub instruction_text: String,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<u8>,
    pub expiry_date: Option<String>,
}

impl From<&BasketLine> for BasketLineRes {
    fn from(line: &BasketLine) -> Self {
        Self {
            id: line.id,
            drug_name: line.drug_name.to_string(),
            instruction_text: line.instruction_text.clone(),
            expiry_month: line.expiry_month.map(|m| m.as_u8()),
            expiry_year: line.expiry_year.map(|y| y.as_u8()),
            expiry_date: line.expiry_date().map(|date| date.short()),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ListBasketRes {
    pub basket: Vec<BasketLineRes>,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReq {
    pub patient_id: u32,
    pub patient_year: u16,
    pub patient_name: String,
    pub drug_name: String,
    pub instruction_text: String,
    pub printed_by: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRes {
    pub audit_id: String,
}

#[derive(serde::Deserialize)]
pub struct MedicationsQuery {
    pub search: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearchQuery {
    pub patient_id: String,
    pub year: String,
}

// Handlers

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint.
///
/// Doubles as the capability probe target for clients deciding whether the
/// audit endpoint is reachable.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Medilabel REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/medications",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive filter over drug names and instructions")
    ),
    responses(
        (status = 200, description = "Medications ordered by drug name", body = ListMedicationsRes)
    )
)]
/// List the medication catalog, optionally filtered.
///
/// # Returns
/// * `Json<ListMedicationsRes>` - Medications ordered by drug name, each
///   with its default instruction and optional barcode
#[axum::debug_handler]
async fn list_medications(
    State(state): State<AppState>,
    Query(query): Query<MedicationsQuery>,
) -> Json<ListMedicationsRes> {
    let medications = state
        .catalog
        .search(query.search.as_deref().unwrap_or(""))
        .into_iter()
        .map(|m| MedicationRes {
            drug_name: m.drug_name.clone(),
            instruction: m.instruction_or_default().to_string(),
            barcode: m.barcode.clone(),
        })
        .collect();

    Json(ListMedicationsRes { medications })
}

#[utoipa::path(
    get,
    path = "/api/patients/search",
    params(
        ("patientId" = String, Query, description = "Patient identifier, an integer"),
        ("year" = String, Query, description = "Registration year, an integer")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientRes),
        (status = 400, description = "Non-integer patient id or year"),
        (status = 404, description = "No patient with that id and year")
    )
)]
/// Exact-match patient lookup by id and year.
///
/// Integer validation happens here, on the caller's side of the directory
/// contract; the directory itself only sees parsed values.
#[axum::debug_handler]
async fn search_patient(
    State(state): State<AppState>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<PatientRes>, (StatusCode, &'static str)> {
    let (Ok(patient_id), Ok(year)) = (
        query.patient_id.trim().parse::<u32>(),
        query.year.trim().parse::<u16>(),
    ) else {
        return Err((StatusCode::BAD_REQUEST, "Invalid Patient ID or Year format"));
    };

    match state.directory.find(patient_id, year) {
        Some(patient) => Ok(Json(PatientRes {
            patient_id: patient.patient_id,
            year: patient.year,
            patient_name: patient.patient_name.clone(),
            national_id: patient.national_id.clone(),
            full_id: patient.full_id(),
        })),
        None => {
            tracing::debug!(patient_id, year, "patient not found");
            Err((StatusCode::NOT_FOUND, "Patient not found"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful", body = LoginRes),
        (status = 401, description = "Unknown user, inactive account or wrong password")
    )
)]
/// Check operator credentials.
#[axum::debug_handler]
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>, (StatusCode, &'static str)> {
    match state.auth.login(&req.username, &req.password) {
        Some(operator) => Ok(Json(LoginRes {
            user_id: operator.user_id,
            username: operator.username,
            full_name: operator.full_name,
            access_level: operator.access_level,
        })),
        None => Err((StatusCode::UNAUTHORIZED, "Invalid username or password")),
    }
}

#[utoipa::path(
    post,
    path = "/api/basket/add",
    request_body = AddBasketReq,
    responses(
        (status = 200, description = "Line added", body = AddBasketRes),
        (status = 400, description = "Empty drug name")
    )
)]
/// Add a medication line to the basket.
///
/// When no instruction is supplied the catalog's default for that drug is
/// used, falling back to the fixed default instruction.
#[axum::debug_handler]
async fn add_to_basket(
    State(state): State<AppState>,
    Json(req): Json<AddBasketReq>,
) -> Result<Json<AddBasketRes>, (StatusCode, &'static str)> {
    let instruction = req
        .instruction_text
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| {
            state
                .catalog
                .get(&req.drug_name)
                .map(|m| m.instruction_or_default().to_string())
                .unwrap_or_else(|| medilabel_core::constants::DEFAULT_INSTRUCTION.to_string())
        });

    let mut basket = state.basket.write().await;
    match basket.add(&req.drug_name, &instruction) {
        Ok(id) => Ok(Json(AddBasketRes { id })),
        Err(BasketError::EmptyDrugName) => {
            Err((StatusCode::BAD_REQUEST, "Drug name is required"))
        }
        Err(e) => {
            tracing::error!("Add to basket error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/basket",
    responses(
        (status = 200, description = "Basket lines, alphabetical by drug name", body = ListBasketRes)
    )
)]
/// List the basket.
///
/// The store preserves insertion order; the alphabetical ordering here is
/// presentation only and is applied to a copy.
#[axum::debug_handler]
async fn get_basket(State(state): State<AppState>) -> Json<ListBasketRes> {
    let basket = state.basket.read().await;
    let mut lines: Vec<BasketLineRes> = basket.lines().iter().map(BasketLineRes::from).collect();
    lines.sort_by(|a, b| a.drug_name.to_lowercase().cmp(&b.drug_name.to_lowercase()));

    Json(ListBasketRes { basket: lines })
}

#[utoipa::path(
    delete,
    path = "/api/basket/{id}",
    params(
        ("id" = u64, Path, description = "Basket line id")
    ),
    responses(
        (status = 204, description = "Line removed, or no such line (removal is idempotent)")
    )
)]
/// Remove one basket line; removing an absent id is a no-op.
#[axum::debug_handler]
async fn remove_from_basket(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<u64>,
) -> StatusCode {
    state.basket.write().await.remove(id);
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    delete,
    path = "/api/basket",
    responses(
        (status = 204, description = "Basket cleared")
    )
)]
/// Clear the whole basket; clearing an empty basket succeeds.
#[axum::debug_handler]
async fn clear_basket(State(state): State<AppState>) -> StatusCode {
    state.basket.write().await.clear();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/api/audit",
    request_body = AuditReq,
    responses(
        (status = 200, description = "Record accepted and stored durably", body = AuditRes),
        (status = 500, description = "Ledger write failed")
    )
)]
/// Accept one audit record into the durable ledger.
///
/// Returns the assigned audit id so the client's fallback log can mark the
/// record as reconciled.
#[axum::debug_handler]
async fn record_audit(
    State(state): State<AppState>,
    Json(req): Json<AuditReq>,
) -> Result<Json<AuditRes>, (StatusCode, &'static str)> {
    let record = AuditRecord {
        patient_id: req.patient_id,
        patient_year: req.patient_year,
        patient_name: req.patient_name,
        drug_name: req.drug_name,
        instruction_text: req.instruction_text,
        printed_by: req.printed_by,
        timestamp: Utc::now(),
    };

    match state.ledger.append(record) {
        Ok(audit_id) => Ok(Json(AuditRes {
            audit_id: audit_id.to_string(),
        })),
        Err(e) => {
            tracing::error!("Audit ledger append error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}
