//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tower_http::services::{ServeDir, ServeFile};

use crate::chat::{GENERIC_ERROR_MESSAGE, VALIDATION_ERROR_MESSAGE};
use crate::conversation::Sender;
use crate::core::errors::AppError;
use crate::server::pages::{render_cart, render_shop};

use super::state::AppState;

/// Cookie carrying the cart session key.
pub const CART_COOKIE: &str = "cart_session";

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/history", get(history))
        .route("/chat", post(chat))
        .route("/shop", get(shop_page))
        .route("/cart", get(cart_page))
        .route("/get_cart_count", get(cart_count))
        .route("/add_to_cart", post(add_to_cart))
        .route("/remove_from_cart", post(remove_from_cart))
        .route_service("/", index)
        .nest_service("/static", assets)
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "agency-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat request body. Both fields are required; absence is reported as 400.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default)]
    pub message: Option<String>,
    /// Client-chosen conversation key.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat reply, also used for error texts.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Bot reply or user-facing error text.
    pub response: String,
}

/// Chat error mapped onto a status code and a user-facing text.
struct ChatFailure(AppError);

impl IntoResponse for ChatFailure {
    fn into_response(self) -> Response {
        let (status, text) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, VALIDATION_ERROR_MESSAGE),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE),
        };
        (
            status,
            Json(ChatResponse {
                response: text.to_string(),
            }),
        )
            .into_response()
    }
}

/// Handle a chat message.
async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatFailure> {
    let Json(request) = body.unwrap_or_else(|rejection| {
        tracing::debug!("unreadable chat body: {rejection}");
        Json(ChatRequest::default())
    });

    let reply = state
        .chat
        .respond(request.session_id.as_deref(), request.message.as_deref())
        .await
        .map_err(|err| {
            if !matches!(err, AppError::Validation(_) | AppError::Generation(_)) {
                tracing::error!("chat pipeline failed: {err}");
            }
            ChatFailure(err)
        })?;

    Ok(Json(ChatResponse {
        response: reply.content,
    }))
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Conversation key; missing means empty history.
    pub session_id: Option<String>,
}

/// One history entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `user` or `bot`.
    pub sender: Sender,
    /// Message text.
    pub content: String,
}

/// Return a session's turns, oldest first.
async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, ChatFailure> {
    let messages = state
        .chat
        .history(params.session_id.as_deref())
        .await
        .map_err(|err| {
            tracing::error!("history lookup failed: {err}");
            ChatFailure(err)
        })?;

    Ok(Json(
        messages
            .into_iter()
            .map(|m| HistoryEntry {
                sender: m.sender,
                content: m.content,
            })
            .collect(),
    ))
}

/// Cart request body.
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    /// Product id.
    pub id: i64,
}

/// Cart mutation result.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    /// `success` or `error`.
    pub status: String,
    /// Item count after the operation; absent on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl CartResponse {
    fn success(count: usize) -> Self {
        Self {
            status: "success".to_string(),
            count: Some(count),
        }
    }

    fn error() -> Self {
        Self {
            status: "error".to_string(),
            count: None,
        }
    }
}

/// Cart item count.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartCount {
    /// Number of items.
    pub count: usize,
}

/// Read the cart session cookie, issuing a new one when absent.
fn cart_session(cookies: &Cookies) -> String {
    if let Some(cookie) = cookies.get(CART_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    let session = uuid::Uuid::new_v4().to_string();
    let cookie = Cookie::build((CART_COOKIE, session.clone()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
    session
}

async fn shop_page(State(state): State<Arc<AppState>>, cookies: Cookies) -> Html<String> {
    let session = cart_session(&cookies);
    Html(render_shop(state.catalog.products(), state.cart.count(&session)))
}

async fn cart_page(State(state): State<Arc<AppState>>, cookies: Cookies) -> Html<String> {
    let session = cart_session(&cookies);
    Html(render_cart(&state.cart.view(&session)))
}

async fn cart_count(State(state): State<Arc<AppState>>, cookies: Cookies) -> Json<CartCount> {
    let session = cart_session(&cookies);
    Json(CartCount {
        count: state.cart.count(&session),
    })
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    body: Result<Json<CartRequest>, JsonRejection>,
) -> (StatusCode, Json<CartResponse>) {
    let Ok(Json(request)) = body else {
        return (StatusCode::BAD_REQUEST, Json(CartResponse::error()));
    };
    let session = cart_session(&cookies);

    match state.cart.add(&session, request.id) {
        Ok(count) => (StatusCode::OK, Json(CartResponse::success(count))),
        Err(err) => {
            tracing::debug!("add to cart rejected: {err}");
            (StatusCode::NOT_FOUND, Json(CartResponse::error()))
        }
    }
}

async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    body: Result<Json<CartRequest>, JsonRejection>,
) -> (StatusCode, Json<CartResponse>) {
    let Ok(Json(request)) = body else {
        return (StatusCode::BAD_REQUEST, Json(CartResponse::error()));
    };
    let session = cart_session(&cookies);
    let count = state.cart.remove(&session, request.id);
    (StatusCode::OK, Json(CartResponse::success(count)))
}
