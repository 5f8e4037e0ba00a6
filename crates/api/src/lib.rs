//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, http::header::AUTHORIZATION};
use coffer_core::access_code::{AccessCodeError, SecretCodeService};
use coffer_core::custody::{CustodyOptions, FileCustodyService};
use coffer_core::storage::StorageService;
use coffer_db::{FileRepository, UserRepository};
use coffer_shared::JwtService;
use coffer_shared::config::CustodySettings;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Custody service wired to the production stores.
pub type Custody = FileCustodyService<StorageService, FileRepository, UserRepository>;

/// Room for multipart boundaries and part headers on top of the object itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Object storage, also used to read objects back after code verification.
    pub storage: Arc<StorageService>,
    /// File custody across storage and the database.
    pub custody: Arc<Custody>,
}

impl AppState {
    /// Wires repositories, storage and the custody service together.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured access code width is unsupported.
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        storage: StorageService,
        settings: &CustodySettings,
    ) -> Result<Self, AccessCodeError> {
        let storage = Arc::new(storage);
        let codes = SecretCodeService::new(settings.access_code_width)?;
        let options = CustodyOptions {
            serialize_uploads: settings.serialize_uploads,
            max_object_size: Some(storage.config().max_object_size),
        };
        let custody = FileCustodyService::new(
            Arc::clone(&storage),
            Arc::new(FileRepository::new(db.clone())),
            Arc::new(UserRepository::new(db.clone())),
            codes,
            options,
        );

        Ok(Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            storage,
            custody: Arc::new(custody),
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .storage
        .config()
        .max_object_size
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(
            usize::try_from(body_limit).unwrap_or(usize::MAX),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
