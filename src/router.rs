use axum::{Router, routing::get};

use crate::{AppState, middleware::log_errors, routes};

// 血糖与状态相关的路由
pub fn glucose_routes() -> Router<AppState> {
    Router::new()
        .route("/glucose", get(routes::glucose::get_glucose))
        .route("/status", get(routes::status::get_status))
        .route("/health", get(routes::status::health))
}

// 创建主路由，API_BASE_URI 非空时挂在该前缀下
pub fn create_router(state: AppState) -> Router {
    let base = state.config.api_base_uri.trim_matches('/');
    let router = if base.is_empty() {
        glucose_routes()
    } else {
        Router::new().nest(&format!("/{}", base), glucose_routes())
    };

    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
