//! Keeps the tag → module binding exclusive and both sides of it in sync.

use crate::error::{Error, Result};
use crate::store::{Store, StoreTx, transact};
use crate::types::{Caller, ModuleRef, Tag, TagStatus};

/// Binds `module` to the caller's tag.
///
/// Rebinding the module that is already bound is a no-op.
pub fn bind(store: &dyn Store, caller: &Caller, tag_id: &str, module: &ModuleRef) -> Result<Tag> {
    let tag = transact(store, |tx| {
        let mut tag = tx
            .get_tag(tag_id)?
            .filter(|t| t.is_owned_by(&caller.user_id))
            .ok_or(Error::NotFoundOrNotOwned)?;

        bind_in(tx, &mut tag, module)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, module = %module, user_id = %caller.user_id, "bound tag");
    Ok(tag)
}

/// Removes the binding from the caller's tag. The tag stays claimed.
pub fn unbind_owned(store: &dyn Store, caller: &Caller, tag_id: &str) -> Result<Tag> {
    let tag = transact(store, |tx| {
        let mut tag = tx
            .get_tag(tag_id)?
            .filter(|t| t.is_owned_by(&caller.user_id))
            .ok_or(Error::NotFoundOrNotOwned)?;

        unbind(tx, &mut tag)?;
        tag.status = TagStatus::Claimed;
        tx.update_tag(&tag)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, user_id = %caller.user_id, "unbound tag");
    Ok(tag)
}

/// Binds inside an open transaction and persists the tag.
pub(crate) fn bind_in(tx: &dyn StoreTx, tag: &mut Tag, module: &ModuleRef) -> Result<()> {
    match &tag.binding {
        Some(current) if current == module => return Ok(()),
        Some(_) => return Err(Error::AlreadyBound),
        None => {}
    }

    let record = tx.get_module(module)?.ok_or(Error::NotFound)?;

    if tag.owner_id.as_deref() != Some(record.owner_id.as_str()) {
        return Err(Error::Forbidden);
    }

    if record.tag_id.as_deref().is_some_and(|bound| bound != tag.id) {
        return Err(Error::AlreadyBound);
    }

    tag.binding = Some(module.clone());
    tx.update_tag(tag)?;
    tx.set_module_tag(module, Some(tag.id.as_str()))?;
    Ok(())
}

/// Clears the binding on `tag` and every module back-reference to it.
///
/// Only the module relation is touched: the caller decides the resulting
/// status and writes the tag.
pub(crate) fn unbind(tx: &dyn StoreTx, tag: &mut Tag) -> Result<()> {
    tag.binding = None;
    tx.detach_modules(&tag.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry;
    use crate::domain::testing::Fixture;
    use crate::types::ModuleKind;

    #[test]
    fn test_bind_sets_both_sides() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("ABC123");
        let card = fx.card("u1", None, None, None);
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();

        let bound = bind(&fx.store, &owner, &tag.id, &card).unwrap();
        assert_eq!(bound.binding.as_ref(), Some(&card));
        assert_eq!(bound.module_kind(), Some(ModuleKind::Card));

        let module = fx.store.get_module(&card).unwrap().unwrap();
        assert_eq!(module.tag_id.as_deref(), Some(tag.id.as_str()));
    }

    #[test]
    fn test_bind_is_idempotent() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("ABC123");
        let page = fx.module(ModuleKind::Page, "u1");
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();

        let first = bind(&fx.store, &owner, &tag.id, &page).unwrap();
        let second = bind(&fx.store, &owner, &tag.id, &page).unwrap();
        assert_eq!(first, second);
        assert_eq!(fx.store.get_tag(&tag.id).unwrap().unwrap(), second);
    }

    #[test]
    fn test_bind_second_kind_rejected() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("ABC123");
        let card = fx.card("u1", None, None, None);
        let mug = fx.module(ModuleKind::Mug, "u1");
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();
        bind(&fx.store, &owner, &tag.id, &card).unwrap();
        let before = fx.store.get_tag(&tag.id).unwrap().unwrap();

        let result = bind(&fx.store, &owner, &tag.id, &mug);
        assert!(matches!(result, Err(Error::AlreadyBound)));
        assert_eq!(fx.store.get_tag(&tag.id).unwrap().unwrap(), before);
        assert!(fx.store.get_module(&mug).unwrap().unwrap().tag_id.is_none());
    }

    #[test]
    fn test_bind_foreign_module_forbidden() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        fx.user("u2");
        let tag = fx.tag("ABC123");
        let theirs = fx.module(ModuleKind::Gift, "u2");
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();

        let result = bind(&fx.store, &owner, &tag.id, &theirs);
        assert!(matches!(result, Err(Error::Forbidden)));
        assert!(fx.store.get_tag(&tag.id).unwrap().unwrap().binding.is_none());
    }

    #[test]
    fn test_bind_by_non_owner_hidden() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let stranger = fx.user("u2");
        let tag = fx.tag("ABC123");
        let card = fx.card("u2", None, None, None);
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();

        let result = bind(&fx.store, &stranger, &tag.id, &card);
        assert!(matches!(result, Err(Error::NotFoundOrNotOwned)));
    }

    #[test]
    fn test_bind_missing_module() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("ABC123");
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();

        let result = bind(
            &fx.store,
            &owner,
            &tag.id,
            &ModuleRef::new(ModuleKind::Plant, "nope"),
        );
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn test_module_exposed_by_other_tag_rejected() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let first = fx.tag("FIRST1");
        let second = fx.tag("SECOND");
        let card = fx.card("u1", None, None, None);
        registry::claim_only(&fx.store, &owner, "FIRST1").unwrap();
        registry::claim_only(&fx.store, &owner, "SECOND").unwrap();
        bind(&fx.store, &owner, &first.id, &card).unwrap();

        let result = bind(&fx.store, &owner, &second.id, &card);
        assert!(matches!(result, Err(Error::AlreadyBound)));
    }

    #[test]
    fn test_unbind_owned_clears_back_reference() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("ABC123");
        let plant = fx.module(ModuleKind::Plant, "u1");
        registry::claim_only(&fx.store, &owner, "ABC123").unwrap();
        bind(&fx.store, &owner, &tag.id, &plant).unwrap();

        let tag = unbind_owned(&fx.store, &owner, &tag.id).unwrap();
        assert!(tag.binding.is_none());
        assert_eq!(tag.status, TagStatus::Claimed);
        assert!(tag.is_owned_by("u1"));
        assert!(fx.store.get_module(&plant).unwrap().unwrap().tag_id.is_none());
    }

    #[test]
    fn test_concurrent_binds_have_one_winner() {
        let fx = Fixture::new();
        let owner = fx.user("u1");
        let tag = fx.tag("RACE01");
        let card = fx.card("u1", None, None, None);
        let plant = fx.module(ModuleKind::Plant, "u1");
        registry::claim_only(&fx.store, &owner, "RACE01").unwrap();

        let modules = [card, plant];
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = modules
                .iter()
                .map(|module| s.spawn(|| bind(&fx.store, &owner, &tag.id, module)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winner = results
            .iter()
            .find_map(|r| r.as_ref().ok())
            .and_then(|t| t.binding.clone())
            .unwrap();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(Error::AlreadyBound)))
        );

        for module in &modules {
            let record = fx.store.get_module(module).unwrap().unwrap();
            if *module == winner {
                assert_eq!(record.tag_id.as_deref(), Some(tag.id.as_str()));
            } else {
                assert!(record.tag_id.is_none());
            }
        }
    }
}
