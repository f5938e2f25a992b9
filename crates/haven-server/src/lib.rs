//! Haven Web Server
//!
//! Axum-based REST API for the Haven wellness journal.
//!
//! Security features:
//! - Bearer API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, audio upload limits)
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use haven_core::ai::{AIBackend, AIClient, Transcriber};
use haven_core::config::Config;
use haven_core::db::Database;
use haven_core::Error as CoreError;

mod handlers;

/// Maximum audio upload size (25 MB)
pub const MAX_AUDIO_SIZE: usize = 25 * 1024 * 1024;

/// Maximum JSON request body size (1 MB)
pub const MAX_JSON_SIZE: usize = 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Take API keys and CORS origins from the application config
    pub fn from_config(config: &Config) -> Self {
        Self {
            require_auth: true,
            allowed_origins: config.allowed_origins.clone(),
            api_keys: config.api_keys.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Mood analysis and companion chat; `None` when no API key is configured
    pub ai: Option<AIClient>,
    /// Speech-to-text for voice entries; `None` when no token is configured
    pub transcriber: Option<Transcriber>,
}

impl AppState {
    /// The AI client, or 503 when it is not configured
    pub fn ai(&self) -> Result<&AIClient, AppError> {
        self.ai
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))
    }

    /// The transcriber, or 503 when it is not configured
    pub fn transcriber(&self) -> Result<&Transcriber, AppError> {
        self.transcriber
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("Transcription backend not configured"))
    }
}

/// Authentication middleware - validates bearer API keys
///
/// Keys are compared in constant time to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        tracing::debug!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    AppError::unauthorized("Authentication required").into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Identify the caller for audit logging
/// Returns "api-key" for API key auth, or "local-dev" for unauthenticated
pub fn get_actor(headers: &axum::http::HeaderMap) -> String {
    if headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .is_some()
    {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// Create the application router
///
/// AI and transcription clients are built from `app_config`.
pub fn create_router(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    app_config: &Config,
) -> Router {
    let ai = AIClient::from_config(app_config);
    match ai {
        Some(ref client) => info!(
            host = client.host(),
            model = client.model(),
            "AI backend configured"
        ),
        None => info!("AI backend not configured (set OPENROUTER_API_KEY to enable analysis and chat)"),
    }

    let transcriber = Transcriber::from_config(app_config);
    match transcriber {
        Some(ref t) => info!(backend = t.name(), "Transcription configured"),
        None => info!("Transcription not configured (set HUGGINGFACE_API_TOKEN to enable voice entries)"),
    }

    let state = Arc::new(AppState {
        db,
        config,
        ai,
        transcriber,
    });

    create_router_with_state(state, static_dir)
}

/// Create the application router from prepared state (for testing)
pub fn create_router_with_state(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        // Analysis
        .route("/analyze-text", post(handlers::analyze_text))
        .route(
            "/analyze-voice",
            post(handlers::analyze_voice)
                // multipart framing on top of the audio itself
                .layer(DefaultBodyLimit::max(MAX_AUDIO_SIZE + 64 * 1024)),
        )
        // Journal entries
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route("/entries/timeline", get(handlers::mood_timeline))
        .route(
            "/entries/:id",
            get(handlers::get_entry).delete(handlers::delete_entry),
        )
        // Therapy report
        .route("/report/generate", get(handlers::generate_report))
        .route("/report/summary", get(handlers::report_summary))
        // Companion chat
        .route("/chat/sessions", get(handlers::list_chat_sessions))
        .route(
            "/chat/session/:session_id",
            get(handlers::get_chat_session).delete(handlers::delete_chat_session),
        )
        .route(
            "/chat/session/:session_id/message",
            post(handlers::send_chat_message),
        )
        .route(
            "/chat/session/:session_id/history",
            delete(handlers::clear_chat_history),
        )
        // Audit log
        .route("/audit", get(handlers::list_audit_log));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for audio and images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; media-src 'self' blob:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Health check stays outside the auth layer
        .route("/api/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
    app_config: &Config,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("Authentication required but HAVEN_API_KEYS is empty - every API request will be rejected");
    }
    if app_config.uses_dev_encryption_key() {
        warn!("Using the development field-encryption key - set ENCRYPTION_KEY in production");
    }

    check_ai_connection(app_config).await;

    let app = create_router(db, static_dir, config, app_config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(app_config: &Config) {
    match AIClient::from_config(app_config) {
        Some(client) => {
            if client.health_check().await {
                info!(host = client.host(), model = client.model(), "AI backend connected");
            } else {
                warn!(
                    host = client.host(),
                    model = client.model(),
                    "AI backend configured but not responding"
                );
            }
        }
        None => {
            info!("AI backend not configured (set OPENROUTER_API_KEY to enable AI features)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn payload_too_large(msg: &str) -> Self {
        Self::with_status(StatusCode::PAYLOAD_TOO_LARGE, msg)
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Map a core error to a client-facing response
    ///
    /// Upstream failures keep their taxonomy status; validation and not-found
    /// errors carry their message. Everything else is an opaque 500.
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::Upstream(upstream) => {
                warn!(
                    service = %upstream.service(),
                    status = upstream.status_code(),
                    detail = upstream.detail(),
                    "Upstream request failed"
                );
                let status = StatusCode::from_u16(upstream.status_code())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                Self::with_status(status, &upstream.to_string())
            }
            CoreError::Validation(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&msg),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
