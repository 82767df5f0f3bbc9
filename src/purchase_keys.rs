use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Keys live as long as a checkout session can: one day.
const KEY_TTL_SECS: i64 = 60 * 60 * 24;

#[derive(Debug)]
struct PendingKey {
    ticket_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-process store for one-time purchase keys.
///
/// A key is issued when a purchase is initiated and redeemed exactly once
/// by the payment callback. Redemption removes the entry under a single
/// lock, so a key can never authorize two completions. Expired keys are
/// treated as absent.
#[derive(Clone, Default)]
pub struct PurchaseKeyStore {
    inner: Arc<Mutex<HashMap<Uuid, PendingKey>>>,
}

impl PurchaseKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `ticket_id`. The caller generates the key so it can
    /// embed it in the checkout success URL before the session exists;
    /// registration happens only once the session has been created.
    pub fn register(&self, key: Uuid, ticket_id: Uuid) {
        let expires_at = Utc::now() + Duration::seconds(KEY_TTL_SECS);

        let mut keys = self.inner.lock().expect("purchase key lock poisoned");
        keys.retain(|_, pending| pending.expires_at > Utc::now());
        keys.insert(key, PendingKey {
            ticket_id,
            expires_at,
        });
    }

    /// Redeems `key`, returning its ticket id. The entry is removed in the
    /// same critical section, so a second call with the same key gets
    /// `None`. Expired keys also return `None`.
    pub fn take(&self, key: Uuid) -> Option<Uuid> {
        let mut keys = self.inner.lock().expect("purchase key lock poisoned");
        let pending = keys.remove(&key)?;

        (pending.expires_at > Utc::now()).then_some(pending.ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_key_redeems_once() {
        let store = PurchaseKeyStore::new();
        let ticket_id = Uuid::new_v4();
        let key = Uuid::new_v4();

        store.register(key, ticket_id);

        assert_eq!(store.take(key), Some(ticket_id));
        assert_eq!(store.take(key), None);
    }

    #[test]
    fn unknown_key_is_absent() {
        let store = PurchaseKeyStore::new();
        assert_eq!(store.take(Uuid::new_v4()), None);
    }

    #[test]
    fn expired_key_is_absent() {
        let store = PurchaseKeyStore::new();
        let ticket_id = Uuid::new_v4();
        let key = Uuid::new_v4();

        store
            .inner
            .lock()
            .unwrap()
            .insert(key, PendingKey {
                ticket_id,
                expires_at: Utc::now() - Duration::seconds(1),
            });

        assert_eq!(store.take(key), None);
    }

    #[test]
    fn keys_are_independent() {
        let store = PurchaseKeyStore::new();
        let first_ticket = Uuid::new_v4();
        let second_ticket = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store.register(first, first_ticket);
        store.register(second, second_ticket);

        assert_eq!(store.take(second), Some(second_ticket));
        assert_eq!(store.take(first), Some(first_ticket));
    }
}
