use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::db::push_pagination;
use crate::models::{Event, Ticket, TicketState};
use crate::utils::error::AppError;

const TICKET_COLUMNS: &str = "id, quantity, state_kind, event_id, user_id";

/// Fields for a new ticket row; tickets always start out pending.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub quantity: i32,
    pub event_id: Uuid,
    pub user_id: Uuid,
}

/// Administrative partial update. Setting `state_kind` is how a ticket
/// reaches `Canceled`; there is no dedicated cancellation endpoint.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub quantity: Option<i32>,
    pub state_kind: Option<TicketState>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.state_kind.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TicketListQuery {
    pub user_id: Option<Uuid>,
    pub with_event: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TicketListItem {
    pub ticket: Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

/// Persistence handler for the tickets table.
pub struct TicketHandler {
    pool: PgPool,
}

impl TicketHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &TicketListQuery) -> Result<Vec<TicketListItem>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT tickets.id, tickets.quantity, tickets.state_kind, \
             tickets.event_id, tickets.user_id",
        );

        if query.with_event {
            builder.push(
                ", events.id AS joined_event_id, events.name AS event_name, \
                 events.description AS event_description, events.location AS event_location, \
                 events.start_date AS event_start_date, events.end_date AS event_end_date, \
                 events.creator_id AS event_creator_id",
            );
        }

        builder.push(" FROM tickets");

        if query.with_event {
            builder.push(" INNER JOIN events ON tickets.event_id = events.id");
        }

        if let Some(user_id) = query.user_id {
            builder.push(" WHERE tickets.user_id = ").push_bind(user_id);
        }

        builder.push(" ORDER BY tickets.id");
        push_pagination(&mut builder, query.page, query.limit);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let ticket = Ticket::from_row(&row)?;
                let event = if query.with_event {
                    Some(Event {
                        id: row.try_get("joined_event_id")?,
                        name: row.try_get("event_name")?,
                        description: row.try_get("event_description")?,
                        location: row.try_get("event_location")?,
                        start_date: row.try_get("event_start_date")?,
                        end_date: row.try_get("event_end_date")?,
                        creator_id: row.try_get("event_creator_id")?,
                    })
                } else {
                    None
                };

                Ok(TicketListItem { ticket, event })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(items)
    }

    pub async fn find_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    pub async fn create(&self, new_ticket: NewTicket) -> Result<Option<Ticket>, AppError> {
        let ticket_id = Uuid::new_v4();

        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (id, quantity, state_kind, event_id, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket_id)
        .bind(new_ticket.quantity)
        .bind(TicketState::Pending)
        .bind(new_ticket.event_id)
        .bind(new_ticket.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Updates a ticket matched by id alone; unlike events there is no
    /// ownership predicate on ticket mutations.
    pub async fn update(
        &self,
        ticket_id: Uuid,
        patch: TicketUpdate,
    ) -> Result<Option<Ticket>, AppError> {
        if patch.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE tickets SET ");
        let mut fields = builder.separated(", ");

        if let Some(quantity) = patch.quantity {
            fields.push("quantity = ").push_bind_unseparated(quantity);
        }
        if let Some(state_kind) = patch.state_kind {
            fields
                .push("state_kind = ")
                .push_bind_unseparated(state_kind);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(ticket_id)
            .push(format!(" RETURNING {TICKET_COLUMNS}"));

        let ticket = builder
            .build_query_as::<Ticket>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    pub async fn delete(&self, ticket_id: Uuid) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "DELETE FROM tickets WHERE id = $1 RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        assert!(TicketUpdate::default().is_empty());
        assert!(!TicketUpdate {
            state_kind: Some(TicketState::Canceled),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn list_item_omits_absent_event() {
        let item = TicketListItem {
            ticket: Ticket {
                id: Uuid::new_v4(),
                quantity: 1,
                state_kind: TicketState::Pending,
                event_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            },
            event: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("event").is_none());
        assert_eq!(json["ticket"]["state_kind"], "PENDING");
    }
}
