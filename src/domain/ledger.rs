//! Saved contacts, owned and mutated only by the user who saved them.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{Store, transact};
use crate::types::{
    Caller, Connection, ConnectionStatus, ConnectionTarget, ModuleKind, ModuleRef, Visibility,
};

/// Answer to "has this user already saved this card?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLookup {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

impl ConnectionLookup {
    fn absent() -> Self {
        Self {
            exists: false,
            connection_id: None,
        }
    }
}

/// Whether the caller has saved `card_id`. Anonymous callers and a blank
/// card id always get `false`.
pub fn exists(store: &dyn Store, caller: Option<&Caller>, card_id: &str) -> Result<ConnectionLookup> {
    let Some(caller) = caller else {
        return Ok(ConnectionLookup::absent());
    };
    let card_id = card_id.trim();
    if card_id.is_empty() {
        return Ok(ConnectionLookup::absent());
    }

    let found = store.find_connection(
        &caller.user_id,
        &ConnectionTarget::Card(card_id.to_string()),
    )?;

    Ok(found
        .map(|c| ConnectionLookup {
            exists: true,
            connection_id: Some(c.id),
        })
        .unwrap_or_else(ConnectionLookup::absent))
}

/// Saves `target` to the caller's network.
///
/// Returns the existing connection instead of creating a duplicate; the
/// boolean reports whether a new row was written.
pub fn save(
    store: &dyn Store,
    caller: &Caller,
    target: ConnectionTarget,
    visibility: Visibility,
) -> Result<(Connection, bool)> {
    let (connection, created) = transact(store, |tx| {
        match &target {
            ConnectionTarget::Card(card_id) => {
                tx.get_module(&ModuleRef::new(ModuleKind::Card, card_id.clone()))?
                    .ok_or(Error::NotFound)?;
            }
            ConnectionTarget::Friend(friend_id) => {
                if *friend_id == caller.user_id {
                    return Err(Error::Validation("cannot save yourself".to_string()));
                }
                tx.get_user(friend_id)?.ok_or(Error::NotFound)?;
            }
        }

        if let Some(existing) = tx.find_connection(&caller.user_id, &target)? {
            return Ok((existing, false));
        }

        let connection = Connection {
            id: Uuid::new_v4().to_string(),
            user_id: caller.user_id.clone(),
            target: target.clone(),
            status: ConnectionStatus::Saved,
            visibility,
            created_at: Utc::now(),
        };
        tx.insert_connection(&connection)?;
        Ok((connection, true))
    })?;

    if created {
        tracing::info!(connection_id = %connection.id, user_id = %caller.user_id, "saved connection");
    }
    Ok((connection, created))
}

/// Deletes one of the caller's connections.
pub fn remove(store: &dyn Store, caller: &Caller, connection_id: &str) -> Result<()> {
    transact(store, |tx| {
        let connection = tx.get_connection(connection_id)?.ok_or(Error::NotFound)?;

        if connection.user_id != caller.user_id {
            return Err(Error::Forbidden);
        }

        tx.delete_connection(&connection.id)?;
        Ok(())
    })?;

    tracing::info!(connection_id, user_id = %caller.user_id, "removed connection");
    Ok(())
}

pub fn list(store: &dyn Store, caller: &Caller) -> Result<Vec<Connection>> {
    store.list_user_connections(&caller.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::Fixture;

    fn card_target(card: &ModuleRef) -> ConnectionTarget {
        ConnectionTarget::Card(card.id.clone())
    }

    #[test]
    fn test_save_and_remove_scenario() {
        let fx = Fixture::new();
        let u1 = fx.user("U1");
        let u2 = fx.user("U2");
        let c1 = fx.card("U2", None, None, None);

        let (k1, created) = save(&fx.store, &u1, card_target(&c1), Visibility::Private).unwrap();
        assert!(created);
        assert_eq!(k1.status, ConnectionStatus::Saved);

        let lookup = exists(&fx.store, Some(&u1), &c1.id).unwrap();
        assert!(lookup.exists);
        assert_eq!(lookup.connection_id.as_deref(), Some(k1.id.as_str()));

        assert!(matches!(
            remove(&fx.store, &u2, &k1.id),
            Err(Error::Forbidden)
        ));
        assert!(exists(&fx.store, Some(&u1), &c1.id).unwrap().exists);

        remove(&fx.store, &u1, &k1.id).unwrap();
        assert!(!exists(&fx.store, Some(&u1), &c1.id).unwrap().exists);
    }

    #[test]
    fn test_save_is_deduplicated() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");
        fx.user("u2");
        let card = fx.card("u2", None, None, None);

        let (first, created) = save(&fx.store, &u1, card_target(&card), Visibility::Private).unwrap();
        let (second, created_again) =
            save(&fx.store, &u1, card_target(&card), Visibility::Public).unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(list(&fx.store, &u1).unwrap().len(), 1);
    }

    #[test]
    fn test_anonymous_lookup_is_false() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");
        let card = fx.card("u1", None, None, None);
        save(&fx.store, &u1, card_target(&card), Visibility::Private).unwrap();

        assert_eq!(
            exists(&fx.store, None, &card.id).unwrap(),
            ConnectionLookup::absent()
        );
    }

    #[test]
    fn test_blank_card_id_lookup_is_false() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");

        assert_eq!(exists(&fx.store, Some(&u1), "").unwrap(), ConnectionLookup::absent());
        assert_eq!(exists(&fx.store, Some(&u1), "  ").unwrap(), ConnectionLookup::absent());
    }

    #[test]
    fn test_remove_missing_connection() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");
        assert!(matches!(
            remove(&fx.store, &u1, "missing"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_save_validates_target() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");
        fx.user("u2");

        assert!(matches!(
            save(
                &fx.store,
                &u1,
                ConnectionTarget::Card("missing".to_string()),
                Visibility::Private
            ),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            save(
                &fx.store,
                &u1,
                ConnectionTarget::Friend("u1".to_string()),
                Visibility::Private
            ),
            Err(Error::Validation(_))
        ));

        let (friend, _) = save(
            &fx.store,
            &u1,
            ConnectionTarget::Friend("u2".to_string()),
            Visibility::Public,
        )
        .unwrap();
        assert_eq!(friend.target, ConnectionTarget::Friend("u2".to_string()));
        assert_eq!(friend.visibility, Visibility::Public);
    }

    #[test]
    fn test_list_is_scoped_to_caller() {
        let fx = Fixture::new();
        let u1 = fx.user("u1");
        let u2 = fx.user("u2");
        let a = fx.card("u1", None, None, None);
        let b = fx.card("u2", None, None, None);
        save(&fx.store, &u1, card_target(&b), Visibility::Private).unwrap();
        save(&fx.store, &u2, card_target(&a), Visibility::Private).unwrap();
        save(&fx.store, &u2, card_target(&b), Visibility::Private).unwrap();

        let mine = list(&fx.store, &u1).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|c| c.user_id == "u1"));
    }
}
