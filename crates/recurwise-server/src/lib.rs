//! Recurwise Web Server
//!
//! Axum-based REST API for the Recurwise subscription tracker.
//!
//! Security features:
//! - Bearer JWT / API key / trusted network authentication (secure by default,
//!   use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation with 400 responses for bad input
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use recurwise_core::db::Database;

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Authorization header for bearer JWT and API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Owner used for trusted-network requests and when auth is disabled
pub const LOCAL_USER: &str = "local";

/// Owner used for requests authenticated with a shared API key
pub const API_KEY_USER: &str = "api-key";

/// Bearer JWT validation configuration (HS256 shared secret)
#[derive(Clone, Default)]
pub struct JwtConfig {
    /// Shared HS256 secret; JWT auth is disabled when unset
    pub secret: Option<String>,
    /// Expected `aud` claim, if the issuer sets one
    pub audience: Option<String>,
}

impl JwtConfig {
    pub fn is_enabled(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys for service authentication
    /// Format: "Bearer <key>" in Authorization header
    pub api_keys: Vec<String>,
    /// Bearer JWT validation
    pub jwt: JwtConfig,
    /// Trusted networks that bypass authentication (e.g., "192.168.1.0/24", "10.0.0.5")
    /// Requests from these IPs are allowed without any authentication
    pub trusted_networks: Vec<ipnet::IpNet>,
    /// Trusted proxies whose X-Forwarded-For headers are trusted (e.g., "10.42.0.0/16" for k3s)
    /// When a request comes from a trusted proxy, the client IP is extracted from X-Forwarded-For
    pub trusted_proxies: Vec<ipnet::IpNet>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            jwt: JwtConfig::default(),
            trusted_networks: vec![],
            trusted_proxies: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// How a request was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Authentication disabled (--no-auth)
    #[serde(rename = "none")]
    Disabled,
    TrustedNetwork,
    Jwt,
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "none",
            Self::TrustedNetwork => "trusted_network",
            Self::Jwt => "jwt",
            Self::ApiKey => "api_key",
        }
    }
}

/// The authenticated caller, attached to every request by [`auth_middleware`].
///
/// `user` is also the owner of the records the request reads and writes.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: String,
    pub method: AuthMethod,
}

impl AuthUser {
    fn new(user: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            user: user.into(),
            method,
        }
    }
}

/// Authentication middleware - resolves the caller from trusted networks, bearer JWTs or API keys
///
/// # Security Notes
///
/// **Trusted networks**: Requests from IPs in `trusted_networks` bypass all authentication
/// and act as the `local` user. The client IP is determined from the TCP connection peer
/// address, or from X-Forwarded-For only when the peer is a trusted proxy.
///
/// **Bearer JWT**: `Authorization: Bearer <jwt>` signed with HS256 using the configured
/// shared secret. Expiry is always checked; the audience only when configured. The user is
/// the `email` claim, falling back to `sub`.
///
/// **API keys**: Compared using constant-time comparison to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<axum::extract::ConnectInfo<std::net::SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.config, &request, connect_info.as_ref()) {
        Some(auth) => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        None => {
            warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Authentication required"
                })),
            )
                .into_response()
        }
    }
}

/// Resolve the caller, or `None` if no auth method succeeds
fn authenticate(
    config: &ServerConfig,
    request: &Request,
    connect_info: Option<&axum::extract::ConnectInfo<std::net::SocketAddr>>,
) -> Option<AuthUser> {
    let path = request.uri().path();

    if !config.require_auth {
        return Some(AuthUser::new(LOCAL_USER, AuthMethod::Disabled));
    }

    if !config.trusted_networks.is_empty() {
        let client_ip = get_client_ip(request, connect_info, &config.trusted_proxies);

        debug!(
            ?client_ip,
            trusted_proxies = ?config.trusted_proxies,
            trusted_networks = ?config.trusted_networks,
            path = %path,
            "Checking trusted network auth"
        );

        if let Some(ip) = client_ip {
            if is_ip_trusted(&ip, &config.trusted_networks) {
                debug!(ip = %ip, path = %path, "Authenticated via trusted network");
                return Some(AuthUser::new(LOCAL_USER, AuthMethod::TrustedNetwork));
            }
        }
    }

    let token = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    if config.jwt.is_enabled() {
        match validate_jwt(token, &config.jwt) {
            Ok(user) => {
                debug!(user = %user, path = %path, "Authenticated via JWT");
                return Some(AuthUser::new(user, AuthMethod::Jwt));
            }
            Err(e) => {
                // Not fatal yet: the bearer token may be an API key
                debug!(error = %e, path = %path, "Bearer token is not a valid JWT");
            }
        }
    }

    if validate_api_key(token, &config.api_keys) {
        debug!(user = API_KEY_USER, path = %path, "Authenticated via API key");
        return Some(AuthUser::new(API_KEY_USER, AuthMethod::ApiKey));
    }

    None
}

/// Validate an HS256 bearer JWT and return the user it names
fn validate_jwt(token: &str, config: &JwtConfig) -> Result<String, String> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let secret = config
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or("JWT secret not configured")?;

    let mut validation = Validation::new(Algorithm::HS256);
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    #[derive(serde::Deserialize)]
    struct Claims {
        email: Option<String>,
        sub: Option<String>,
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("JWT validation failed: {}", e))?;

    // Email if present, otherwise subject
    token_data
        .claims
        .email
        .filter(|e| !e.trim().is_empty())
        .or(token_data.claims.sub.filter(|s| !s.trim().is_empty()))
        .ok_or_else(|| "JWT has neither email nor sub claim".to_string())
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes)) {
            return true;
        }
    }
    false
}

/// Extract client IP address, respecting trusted proxies
///
/// SECURITY: X-Forwarded-For headers are ONLY trusted when the TCP connection
/// comes from a configured trusted proxy. Otherwise, only the actual TCP
/// peer address is used (to prevent header spoofing attacks).
pub(crate) fn get_client_ip(
    request: &Request,
    connect_info: Option<&axum::extract::ConnectInfo<std::net::SocketAddr>>,
    trusted_proxies: &[ipnet::IpNet],
) -> Option<std::net::IpAddr> {
    let peer_ip = connect_info.map(|ci| ci.0.ip())?;

    if trusted_proxies.is_empty() {
        return Some(peer_ip);
    }

    let peer_is_trusted_proxy = trusted_proxies.iter().any(|net| net.contains(&peer_ip));

    if peer_is_trusted_proxy {
        // "client, proxy1, proxy2" - the first entry is the original client
        if let Some(forwarded_for) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
        {
            if let Some(client_ip_str) = forwarded_for.split(',').next() {
                if let Ok(client_ip) = client_ip_str.trim().parse::<std::net::IpAddr>() {
                    return Some(client_ip);
                }
            }
        }

        if let Some(real_ip) = request
            .headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
        {
            if let Ok(client_ip) = real_ip.trim().parse::<std::net::IpAddr>() {
                return Some(client_ip);
            }
        }
    }

    Some(peer_ip)
}

/// Check if an IP address is within any of the trusted networks
fn is_ip_trusted(ip: &std::net::IpAddr, trusted_networks: &[ipnet::IpNet]) -> bool {
    trusted_networks.iter().any(|network| network.contains(ip))
}

/// Parse a comma-separated list of IP addresses and CIDR networks
///
/// Examples:
/// - "192.168.1.0/24" - entire subnet
/// - "10.0.0.5" - single IP (parsed as /32 for IPv4 or /128 for IPv6)
/// - "192.168.1.0/24,10.0.0.0/8" - multiple networks
pub fn parse_trusted_networks(input: &str) -> Vec<ipnet::IpNet> {
    input
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(net) = s.parse::<ipnet::IpNet>() {
                return Some(net);
            }
            if let Ok(ip) = s.parse::<std::net::IpAddr>() {
                return Some(ipnet::IpNet::from(ip));
            }
            warn!(input = s, "Failed to parse trusted network entry");
            None
        })
        .collect()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Catalog
        .route("/categories", get(handlers::list_categories))
        // Subscriptions
        .route(
            "/subscriptions",
            get(handlers::list_subscriptions).post(handlers::create_subscription),
        )
        .route(
            "/subscriptions/:id",
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
        // Dashboard and spend
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/summary", get(handlers::get_summary))
        // Audit log
        .route("/audit", get(handlers::list_audit_log))
        // Export / backup
        .route("/export/csv", get(handlers::export_csv))
        .route("/export/json", get(handlers::export_json))
        .route("/import/json", post(handlers::import_json));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: restrict scripts to same-origin, allow inline styles
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
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
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if !config.jwt.is_enabled()
        && config.api_keys.is_empty()
        && config.trusted_networks.is_empty()
    {
        warn!("⚠️  No auth method configured - every API request will be rejected");
    }

    let app = create_router(db, static_dir, config)
        .into_make_service_with_connect_info::<std::net::SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
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
        use recurwise_core::Error as CoreError;

        let err = err.into();
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::InvalidData(msg)) | Some(CoreError::Backup(msg)) => {
                Self::bad_request(msg)
            }
            Some(CoreError::NotFound(what)) => Self::not_found(&format!("{} not found", what)),
            _ => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(err),
            },
        }
    }
}
