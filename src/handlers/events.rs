use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::event::{EventListQuery, EventUpdate, NewEvent};
use crate::handlers::validate_pagination;
use crate::models::SafeUser;
use crate::policy::{authorize, Action};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct EventListParams {
    #[serde(rename = "user-id")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "with-ticket-count")]
    pub with_ticket_count: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Ticket price in minor currency units.
    pub price: i64,
}

impl CreateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        if self.price < 0 {
            return Err(AppError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(AppError::ValidationError(
                "end_date must not precede start_date".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<UpdateEventRequest> for EventUpdate {
    fn from(body: UpdateEventRequest) -> Self {
        Self {
            name: body.name,
            description: body.description,
            location: body.location,
            start_date: body.start_date,
            end_date: body.end_date,
        }
    }
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<Response, AppError> {
    validate_pagination(params.page, params.limit)?;

    let events = state
        .event_handler()
        .list(&EventListQuery {
            user_id: params.user_id,
            with_ticket_count: params.with_ticket_count.unwrap_or(false),
            page: params.page,
            limit: params.limit,
        })
        .await?;

    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .event_handler()
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find event".to_string()))?;

    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::CreateEvent)?;
    body.validate()?;

    let event = state
        .event_handler()
        .create(
            NewEvent {
                name: body.name,
                description: body.description,
                location: body.location,
                start_date: body.start_date,
                end_date: body.end_date,
                creator_id: user.id,
            },
            body.price,
        )
        .await?
        .ok_or_else(|| AppError::InternalServerError("Event not created".to_string()))?;

    Ok(success(event, "Event created"))
}

/// The update predicate also matches on the session user's id, so a
/// request against someone else's event updates zero rows.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::UpdateEvent)?;

    let event = state
        .event_handler()
        .update(user.id, event_id, body.into())
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError("Could not update due to an error".to_string())
        })?;

    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::DeleteEvent)?;

    let event = state
        .event_handler()
        .delete(user.id, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find event".to_string()))?;

    Ok(success(event, "Event deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateEventRequest {
        CreateEventRequest {
            name: "LAN Party".to_string(),
            description: "Bring your own rig".to_string(),
            location: "Aarhus".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + chrono::Duration::hours(8),
            price: 100,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let body = CreateEventRequest {
            price: -1,
            ..sample_request()
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let body = CreateEventRequest {
            end_date: Utc::now() - chrono::Duration::hours(1),
            ..sample_request()
        };
        assert!(body.validate().is_err());
    }
}
