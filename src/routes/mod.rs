use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::auth::require_session;
use crate::config::create_cors_layer;
use crate::handlers::{auth, comments, events, health_check, posts, tickets};
use crate::state::AppState;

/// Assembles the full route tree. Event, post and comment reads are
/// public; mutations and all ticket routes sit behind the session
/// middleware, except the payment callback which authenticates by
/// one-time key instead.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes(state.clone()))
        .merge(event_routes(state.clone()))
        .merge(ticket_routes(state.clone()))
        .merge(post_routes(state.clone()))
        .merge(comment_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in));

    let protected = Router::new()
        .route("/auth/validate", get(auth::validate))
        .route("/auth/sign-out", get(auth::sign_out))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    public.merge(protected)
}

fn event_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event));

    let protected = Router::new()
        .route("/events", post(events::create_event))
        .route("/events/:id", put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    public.merge(protected)
}

// Unlike events, posts and comments, ticket reads are not public:
// every ticket route except the key-authenticated callback sits behind
// the session middleware.
fn ticket_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/tickets/payment-callback", get(tickets::payment_callback));

    let protected = Router::new()
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::purchase_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route_layer(middleware::from_fn_with_state(state, require_session));

    public.merge(protected)
}

fn post_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/:id", get(posts::get_post));

    let protected = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/:id", put(posts::update_post))
        .route("/posts/:id", delete(posts::delete_post))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    public.merge(protected)
}

fn comment_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/comments", get(comments::list_comments))
        .route("/comments/:id", get(comments::get_comment));

    let protected = Router::new()
        .route("/comments", post(comments::create_comment))
        .route("/comments/:id", put(comments::update_comment))
        .route("/comments/:id", delete(comments::delete_comment))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    public.merge(protected)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;

    // Lazy pool: never connects, so the guard must reject before any
    // handler reaches the database.
    fn test_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/queueup")
            .expect("lazy pool");

        let config = Config {
            database_url: "postgres://localhost/queueup".to_string(),
            session_secret: "secret".to_string(),
            payment_secret_key: "sk_test".to_string(),
            payment_api_url: "http://localhost:9".to_string(),
            public_base_url: "http://localhost:3001".to_string(),
            client_url: "http://localhost:5173".to_string(),
            port: 3001,
        };

        AppState::new(pool, config)
    }

    async fn get_status(path: &str) -> StatusCode {
        let app = create_routes(test_state());
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        response.status()
    }

    #[tokio::test]
    async fn ticket_reads_require_a_session() {
        assert_eq!(get_status("/tickets").await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(&format!("/tickets/{}", Uuid::new_v4())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn payment_callback_is_public() {
        // An unknown key answers 404, not 401: the route is reachable
        // without a session.
        assert_eq!(
            get_status(&format!("/tickets/payment-callback?key={}", Uuid::new_v4())).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn sign_out_requires_a_session() {
        assert_eq!(get_status("/auth/sign-out").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_is_public() {
        assert_eq!(get_status("/health").await, StatusCode::OK);
    }
}
