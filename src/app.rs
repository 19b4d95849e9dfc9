use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::content::{ContentRecord, RelatedContent};
use crate::database::models::{Blog, CaseStudy};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::store::{AccountStore, ContentStore};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blogs: Arc<dyn ContentStore<Blog>>,
    pub case_studies: Arc<dyn ContentStore<CaseStudy>>,
    pub accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// State backed by a single store serving every table
    pub fn new<S>(config: AppConfig, store: S) -> Self
    where
        S: ContentStore<Blog> + ContentStore<CaseStudy> + AccountStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            config: Arc::new(config),
            blogs: store.clone(),
            case_studies: store.clone(),
            accounts: store,
        }
    }
}

/// Per-kind access to state, so content handlers can be generic
pub trait ContentState<T: ContentRecord> {
    fn content_store(&self) -> Arc<dyn ContentStore<T>>;

    fn default_related_limit(&self) -> usize;

    fn related(&self) -> RelatedContent<T> {
        RelatedContent::new(self.content_store(), self.overlap_mode())
    }

    fn overlap_mode(&self) -> crate::content::OverlapMode;
}

impl ContentState<Blog> for AppState {
    fn content_store(&self) -> Arc<dyn ContentStore<Blog>> {
        self.blogs.clone()
    }

    fn default_related_limit(&self) -> usize {
        self.config.content.related_blog_limit
    }

    fn overlap_mode(&self) -> crate::content::OverlapMode {
        self.config.content.tag_overlap
    }
}

impl ContentState<CaseStudy> for AppState {
    fn content_store(&self) -> Arc<dyn ContentStore<CaseStudy>> {
        self.case_studies.clone()
    }

    fn default_related_limit(&self) -> usize {
        self.config.content.related_case_study_limit
    }

    fn overlap_mode(&self) -> crate::content::OverlapMode {
        self.config.content.tag_overlap
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let protected = Router::new()
        .merge(session_routes())
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(content_routes())
        .route("/api/auth/login", axum::routing::post(public::auth::login))
        // Protected (JWT + fresh permission lookup)
        .merge(protected)
        // Global middleware
        .layer(cors)
        .with_state(state);

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn content_routes() -> Router<AppState> {
    use public::content;

    Router::new()
        .route("/api/blogs", get(content::list::<Blog>))
        .route("/api/blogs/:slug", get(content::show::<Blog>))
        .route("/api/related/blogs/:id", get(content::related::<Blog>))
        .route("/api/case-studies", get(content::list::<CaseStudy>))
        .route("/api/case-studies/:slug", get(content::show::<CaseStudy>))
        .route("/api/related/case-studies/:id", get(content::related::<CaseStudy>))
}

fn session_routes() -> Router<AppState> {
    Router::new().route("/api/auth/whoami", get(protected::session::whoami))
}

fn admin_routes() -> Router<AppState> {
    use protected::{content, user_types, users};

    Router::new()
        .route("/api/admin/permissions", get(user_types::catalog))
        // Content
        .route(
            "/api/admin/blogs",
            get(content::list::<Blog>).post(content::create::<Blog>),
        )
        .route(
            "/api/admin/blogs/:id",
            get(content::show::<Blog>)
                .put(content::update::<Blog>)
                .delete(content::delete::<Blog>),
        )
        .route(
            "/api/admin/case-studies",
            get(content::list::<CaseStudy>).post(content::create::<CaseStudy>),
        )
        .route(
            "/api/admin/case-studies/:id",
            get(content::show::<CaseStudy>)
                .put(content::update::<CaseStudy>)
                .delete(content::delete::<CaseStudy>),
        )
        // Accounts
        .route("/api/admin/users", get(users::list).post(users::create))
        .route(
            "/api/admin/users/:id",
            get(users::show).put(users::update).delete(users::delete),
        )
        .route("/api/admin/user-types", get(user_types::list).post(user_types::create))
        .route(
            "/api/admin/user-types/:id",
            get(user_types::show)
                .put(user_types::update)
                .delete(user_types::delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Marketing CMS API",
            "version": version,
            "endpoints": {
                "blogs": "/api/blogs[/:slug] (public)",
                "case_studies": "/api/case-studies[/:slug] (public)",
                "related": "/api/related/{blogs,case-studies}/:id (public)",
                "auth": "/api/auth/login (public), /api/auth/whoami (protected)",
                "admin": "/api/admin/{blogs,case-studies,users,user-types}[/:id], /api/admin/permissions (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.accounts.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
