use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::db::push_pagination;
use crate::models::{Event, PaymentPrice};
use crate::payment::PaymentClient;
use crate::utils::error::AppError;

const EVENT_COLUMNS: &str = "id, name, description, location, start_date, end_date, creator_id";

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub creator_id: Uuid,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Optional list clauses; each one independently attaches a filter,
/// a computed column or pagination to the query.
#[derive(Debug, Clone, Default)]
pub struct EventListQuery {
    pub user_id: Option<Uuid>,
    pub with_ticket_count: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EventListItem {
    pub event: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_count: Option<i64>,
}

/// Persistence handler for the events table and its payment product
/// mapping rows.
pub struct EventHandler {
    pool: PgPool,
    payment: PaymentClient,
}

impl EventHandler {
    pub fn new(pool: PgPool, payment: PaymentClient) -> Self {
        Self { pool, payment }
    }

    pub async fn list(&self, query: &EventListQuery) -> Result<Vec<EventListItem>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT events.id, events.name, events.description, events.location, \
             events.start_date, events.end_date, events.creator_id",
        );

        if query.with_ticket_count {
            builder.push(
                ", (SELECT COUNT(*) FROM tickets WHERE tickets.event_id = events.id) AS ticket_count",
            );
        }

        builder.push(" FROM events");

        if let Some(user_id) = query.user_id {
            builder.push(" WHERE events.creator_id = ").push_bind(user_id);
        }

        builder.push(" ORDER BY events.start_date");
        push_pagination(&mut builder, query.page, query.limit);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let event = Event::from_row(&row)?;
                let ticket_count = if query.with_ticket_count {
                    Some(row.try_get("ticket_count")?)
                } else {
                    None
                };

                Ok(EventListItem {
                    event,
                    ticket_count,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(items)
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Inserts the event and creates its payment product and price
    /// mapping inside one transaction. A provider failure or a mapping
    /// insert failure rolls the event back, so no event exists without
    /// its product mapping.
    pub async fn create(
        &self,
        new_event: NewEvent,
        price: i64,
    ) -> Result<Option<Event>, AppError> {
        let event_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (id, name, description, location, start_date, end_date, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event_id)
        .bind(&new_event.name)
        .bind(&new_event.description)
        .bind(&new_event.location)
        .bind(new_event.start_date)
        .bind(new_event.end_date)
        .bind(new_event.creator_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(event) = inserted else {
            return Ok(None);
        };

        let refs = self.payment.create_product(&event, price).await?;

        sqlx::query("INSERT INTO payment_products (event_id, product_ref) VALUES ($1, $2)")
            .bind(event.id)
            .bind(&refs.product_ref)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO payment_prices (product_ref, price_ref, amount) VALUES ($1, $2, $3)")
            .bind(&refs.product_ref)
            .bind(&refs.price_ref)
            .bind(price)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(event))
    }

    /// Updates an event matched by id and creator. A mutation aimed at
    /// someone else's event matches zero rows and returns `None`.
    pub async fn update(
        &self,
        creator_id: Uuid,
        event_id: Uuid,
        patch: EventUpdate,
    ) -> Result<Option<Event>, AppError> {
        if patch.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE events SET ");
        let mut fields = builder.separated(", ");

        if let Some(name) = patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = patch.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description);
        }
        if let Some(location) = patch.location {
            fields.push("location = ").push_bind_unseparated(location);
        }
        if let Some(start_date) = patch.start_date {
            fields
                .push("start_date = ")
                .push_bind_unseparated(start_date);
        }
        if let Some(end_date) = patch.end_date {
            fields.push("end_date = ").push_bind_unseparated(end_date);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(event_id)
            .push(" AND creator_id = ")
            .push_bind(creator_id)
            .push(format!(" RETURNING {EVENT_COLUMNS}"));

        let event = builder
            .build_query_as::<Event>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Deletes an event matched by id and creator; same ownership rule
    /// as [`EventHandler::update`].
    pub async fn delete(
        &self,
        creator_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "DELETE FROM events WHERE id = $1 AND creator_id = $2 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event_id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Resolves the price mapping for an event's payment product.
    pub async fn find_price(&self, event_id: Uuid) -> Result<Option<PaymentPrice>, AppError> {
        let price = sqlx::query_as::<_, PaymentPrice>(
            "SELECT payment_prices.product_ref, payment_prices.price_ref, payment_prices.amount \
             FROM payment_prices \
             INNER JOIN payment_products \
             ON payment_products.product_ref = payment_prices.product_ref \
             WHERE payment_products.event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        assert!(EventUpdate::default().is_empty());
        assert!(!EventUpdate {
            name: Some("new name".to_string()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn list_item_omits_absent_ticket_count() {
        let item = EventListItem {
            event: Event {
                id: Uuid::new_v4(),
                name: "LAN Party".to_string(),
                description: "desc".to_string(),
                location: "Aarhus".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now(),
                creator_id: Uuid::new_v4(),
            },
            ticket_count: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("ticket_count").is_none());
    }
}
