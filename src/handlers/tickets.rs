use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::ticket::{TicketListQuery, TicketUpdate};
use crate::handlers::validate_pagination;
use crate::models::{SafeUser, TicketState};
use crate::policy::{authorize, Action};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    #[serde(rename = "user-id")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "with-event")]
    pub with_event: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseTicketRequest {
    pub event_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub quantity: Option<i32>,
    pub state_kind: Option<TicketState>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentCallbackParams {
    pub key: Uuid,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> Result<Response, AppError> {
    validate_pagination(params.page, params.limit)?;

    let tickets = state
        .ticket_handler()
        .list(&TicketListQuery {
            user_id: params.user_id,
            with_event: params.with_event.unwrap_or(false),
            page: params.page,
            limit: params.limit,
        })
        .await?;

    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket = state
        .ticket_handler()
        .find_by_id(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find ticket".to_string()))?;

    Ok(success(ticket, "Ticket retrieved"))
}

/// Creating a ticket is a purchase: the ticket is inserted in PENDING
/// state and the response carries the provider checkout URL the client
/// must redirect to.
pub async fn purchase_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Json(body): Json<PurchaseTicketRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::PurchaseTicket)?;

    if body.quantity < 1 {
        return Err(AppError::ValidationError(
            "quantity must be at least 1".to_string(),
        ));
    }

    let outcome = state
        .ticket_purchase()
        .initiate(user.id, body.event_id, body.quantity)
        .await?;

    Ok(success(outcome, "Ticket created"))
}

/// Redemption target for the provider's success redirect. Public by
/// necessity: the provider does not hold a session, so possession of
/// the one-time key is the whole credential.
pub async fn payment_callback(
    State(state): State<AppState>,
    Query(params): Query<PaymentCallbackParams>,
) -> Result<Response, AppError> {
    state.ticket_purchase().complete(params.key).await?;

    Ok(empty_success("Ticket purchase completed"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(ticket_id): Path<Uuid>,
    Json(body): Json<UpdateTicketRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManageTicket)?;

    let ticket = state
        .ticket_handler()
        .update(
            ticket_id,
            TicketUpdate {
                quantity: body.quantity,
                state_kind: body.state_kind,
            },
        )
        .await?
        .ok_or_else(|| AppError::InternalServerError("Could not update ticket".to_string()))?;

    Ok(success(ticket, "Ticket updated"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManageTicket)?;

    let ticket = state
        .ticket_handler()
        .delete(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find ticket".to_string()))?;

    Ok(success(ticket, "Ticket deleted"))
}
