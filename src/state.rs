use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::{CommentHandler, EventHandler, PostHandler, TicketHandler, UserHandler};
use crate::payment::PaymentClient;
use crate::purchase::TicketPurchase;
use crate::purchase_keys::PurchaseKeyStore;

/// Shared application state: one pool, one payment client and one
/// purchase key store for the process, all constructed at startup and
/// injected here. Handlers are built per request from these.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub payment: PaymentClient,
    pub purchase_keys: PurchaseKeyStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let payment = PaymentClient::new(
            config.payment_api_url.clone(),
            config.payment_secret_key.clone(),
        );

        Self {
            pool,
            config: Arc::new(config),
            payment,
            purchase_keys: PurchaseKeyStore::new(),
        }
    }

    pub fn user_handler(&self) -> UserHandler {
        UserHandler::new(self.pool.clone(), self.payment.clone())
    }

    pub fn event_handler(&self) -> EventHandler {
        EventHandler::new(self.pool.clone(), self.payment.clone())
    }

    pub fn ticket_handler(&self) -> TicketHandler {
        TicketHandler::new(self.pool.clone())
    }

    pub fn post_handler(&self) -> PostHandler {
        PostHandler::new(self.pool.clone())
    }

    pub fn comment_handler(&self) -> CommentHandler {
        CommentHandler::new(self.pool.clone())
    }

    pub fn ticket_purchase(&self) -> TicketPurchase {
        TicketPurchase::new(self)
    }
}
