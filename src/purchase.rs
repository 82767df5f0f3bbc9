//! The ticket purchase workflow.
//!
//! Coordinates the ticket and event handlers with the payment adapter to
//! move a ticket through its states: a pending ticket plus a checkout
//! session on initiation, then completion when the provider's callback
//! redeems the one-time key. The callback may be delivered more than
//! once, but the key store's take-once semantics guarantee at most one
//! successful completion per key.

use serde::Serialize;
use uuid::Uuid;

use crate::db::ticket::{NewTicket, TicketUpdate};
use crate::db::{EventHandler, TicketHandler, UserHandler};
use crate::models::{Ticket, TicketState};
use crate::payment::{CheckoutUrls, PaymentClient};
use crate::purchase_keys::PurchaseKeyStore;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Result of a successful purchase initiation: the pending ticket and
/// the checkout URL the client is redirected to.
#[derive(Debug, Serialize)]
pub struct PurchaseOutcome {
    pub ticket: Ticket,
    pub checkout_url: String,
}

pub struct TicketPurchase {
    users: UserHandler,
    events: EventHandler,
    tickets: TicketHandler,
    payment: PaymentClient,
    keys: PurchaseKeyStore,
    public_base_url: String,
    client_url: String,
}

impl TicketPurchase {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.user_handler(),
            events: state.event_handler(),
            tickets: state.ticket_handler(),
            payment: state.payment.clone(),
            keys: state.purchase_keys.clone(),
            public_base_url: state.config.public_base_url.clone(),
            client_url: state.config.client_url.clone(),
        }
    }

    /// Initiates a purchase: inserts a pending ticket, resolves the
    /// event's price mapping, opens a checkout session whose success URL
    /// embeds a fresh one-time key, and registers the key once the
    /// session exists. A missing customer or price mapping is a server
    /// error, not a silent success.
    pub async fn initiate(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        quantity: i32,
    ) -> Result<PurchaseOutcome, AppError> {
        let customer_ref = self
            .users
            .find_customer_ref(user_id)
            .await?
            .ok_or_else(could_not_create)?;

        let ticket = self
            .tickets
            .create(NewTicket {
                quantity,
                event_id,
                user_id,
            })
            .await?
            .ok_or_else(could_not_create)?;

        let price = self
            .events
            .find_price(event_id)
            .await?
            .ok_or_else(could_not_create)?;

        let key = Uuid::new_v4();
        let urls = CheckoutUrls {
            success: format!(
                "{}/tickets/payment-callback?key={}",
                self.public_base_url, key
            ),
            cancel: format!("{}/events/{}", self.client_url, event_id),
        };

        let checkout_url = self
            .payment
            .create_checkout_session(&customer_ref, &price.price_ref, quantity, &urls)
            .await?;

        self.keys.register(key, ticket.id);

        tracing::info!(ticket_id = %ticket.id, event_id = %event_id, "Ticket purchase initiated");

        Ok(PurchaseOutcome {
            ticket,
            checkout_url,
        })
    }

    /// Completes the purchase bound to `key`. Unknown, expired and
    /// already-redeemed keys all report "not found" and leave every
    /// ticket untouched.
    pub async fn complete(&self, key: Uuid) -> Result<Ticket, AppError> {
        let ticket_id = self
            .keys
            .take(key)
            .ok_or_else(|| AppError::NotFound("Could not find ticket with given key".to_string()))?;

        let ticket = self
            .tickets
            .update(ticket_id, TicketUpdate {
                state_kind: Some(TicketState::Completed),
                ..Default::default()
            })
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError("Could not update ticket".to_string())
            })?;

        tracing::info!(ticket_id = %ticket.id, "Ticket purchase completed");

        Ok(ticket)
    }
}

fn could_not_create() -> AppError {
    AppError::InternalServerError("Could not create ticket".to_string())
}
