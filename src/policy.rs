//! Authorization policy for mutating operations.
//!
//! Role checks live here as one auditable table instead of being scattered
//! through the HTTP handlers. Ownership is a separate dimension: for
//! owner-scoped actions the persistence handler adds the acting user's id
//! to the query predicate, so a mutation aimed at someone else's row
//! matches zero rows instead of raising a permission error.

use crate::models::UserRole;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    PurchaseTicket,
    ManageTicket,
    CreatePost,
    ManagePost,
    CreateComment,
    ManageComment,
}

/// Checks whether `role` may perform `action`. Returns an unauthorized
/// error with a specific message on deny.
pub fn authorize(role: UserRole, action: Action) -> Result<(), AppError> {
    let allowed = match action {
        // Only organisers run events.
        Action::CreateEvent => role == UserRole::Organiser,
        // Only guests purchase tickets; organisers and admins sell.
        Action::PurchaseTicket => role == UserRole::Guest,
        // Any authenticated user; events additionally owner-scoped below.
        Action::UpdateEvent
        | Action::DeleteEvent
        | Action::ManageTicket
        | Action::CreatePost
        | Action::ManagePost
        | Action::CreateComment
        | Action::ManageComment => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::AuthError(deny_message(action).to_string()))
    }
}

/// Whether the persistence predicate for `action` must also match the
/// acting user's id. Event mutations are owner-scoped; ticket, post and
/// comment mutations match by id alone.
pub fn owner_scoped(action: Action) -> bool {
    matches!(action, Action::UpdateEvent | Action::DeleteEvent)
}

fn deny_message(action: Action) -> &'static str {
    match action {
        Action::CreateEvent => "Only organisers can create events",
        Action::PurchaseTicket => "Only guests can purchase tickets",
        _ => "Unauthorized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_organisers_create_events() {
        assert!(authorize(UserRole::Organiser, Action::CreateEvent).is_ok());
        assert!(authorize(UserRole::Guest, Action::CreateEvent).is_err());
        assert!(authorize(UserRole::Admin, Action::CreateEvent).is_err());
    }

    #[test]
    fn only_guests_purchase_tickets() {
        assert!(authorize(UserRole::Guest, Action::PurchaseTicket).is_ok());
        assert!(authorize(UserRole::Organiser, Action::PurchaseTicket).is_err());
    }

    #[test]
    fn forum_actions_are_open_to_all_roles() {
        for role in [UserRole::Guest, UserRole::Organiser, UserRole::Admin] {
            assert!(authorize(role, Action::CreatePost).is_ok());
            assert!(authorize(role, Action::ManageComment).is_ok());
        }
    }

    #[test]
    fn only_event_mutations_are_owner_scoped() {
        assert!(owner_scoped(Action::UpdateEvent));
        assert!(owner_scoped(Action::DeleteEvent));
        assert!(!owner_scoped(Action::ManageTicket));
        assert!(!owner_scoped(Action::ManagePost));
    }

    #[test]
    fn denials_carry_a_specific_message() {
        let err = authorize(UserRole::Guest, Action::CreateEvent).unwrap_err();
        assert!(matches!(err, AppError::AuthError(msg) if msg.contains("organisers")));
    }
}
