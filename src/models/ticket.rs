use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Purchase state of a ticket.
///
/// A ticket is inserted as `Pending` and moves to `Completed` when the
/// payment provider's callback redeems the one-time purchase key.
/// `Canceled` is only reachable through the administrative ticket update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketState {
    Pending,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub quantity: i32,
    pub state_kind: TicketState,
    pub event_id: Uuid,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_uses_uppercase_wire_form() {
        assert_eq!(
            serde_json::to_string(&TicketState::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::from_str::<TicketState>("\"COMPLETED\"").unwrap(),
            TicketState::Completed
        );
    }
}
