//! Tag lifecycle: claim, release, administrative reset and lookup.
//!
//! Every mutation runs in one store transaction, so two callers racing for
//! the same tag cannot both become its owner.

use chrono::Utc;

use super::binder;
use crate::error::{Error, Result};
use crate::store::{Store, StoreTx, transact};
use crate::types::{Caller, ModuleRef, Tag, TagSnapshot};

/// How a public lookup identifies a tag.
#[derive(Debug, Clone, Copy)]
pub enum TagKey<'a> {
    /// The short code printed on the tag.
    Code(&'a str),
    /// The hardware identifier read from the chip.
    Uid(&'a str),
}

fn claim_in(tx: &dyn StoreTx, caller: &Caller, public_code: &str) -> Result<Tag> {
    let code = public_code.trim();
    if code.is_empty() {
        return Err(Error::Validation("code is required".to_string()));
    }

    let mut tag = tx.get_tag_by_code(code)?.ok_or(Error::NotFound)?;
    tag.claim(&caller.user_id, Utc::now())?;
    tx.update_tag(&tag)?;
    Ok(tag)
}

/// Takes ownership of a free tag without binding any content to it.
pub fn claim_only(store: &dyn Store, caller: &Caller, public_code: &str) -> Result<Tag> {
    let tag = transact(store, |tx| claim_in(tx, caller, public_code))?;

    tracing::info!(tag_id = %tag.id, user_id = %caller.user_id, "claimed tag");
    Ok(tag)
}

/// Claims a tag and binds `module` to it atomically. If the bind fails the
/// claim is rolled back.
pub fn claim_and_bind(
    store: &dyn Store,
    caller: &Caller,
    public_code: &str,
    module: &ModuleRef,
) -> Result<Tag> {
    let tag = transact(store, |tx| {
        let mut tag = claim_in(tx, caller, public_code)?;
        binder::bind_in(tx, &mut tag, module)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, user_id = %caller.user_id, module = %module, "claimed and bound tag");
    Ok(tag)
}

/// Returns a tag to the provisioning pool, disconnecting any bound module.
pub fn admin_unclaim(store: &dyn Store, caller: &Caller, tag_id: &str) -> Result<Tag> {
    caller.require_admin()?;

    let tag = transact(store, |tx| {
        let mut tag = tx.get_tag(tag_id)?.ok_or(Error::NotFound)?;
        binder::unbind(tx, &mut tag)?;
        tag.reset_unclaimed();
        tx.update_tag(&tag)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, admin_id = %caller.user_id, "admin unclaimed tag");
    Ok(tag)
}

/// Revokes a tag's content binding while leaving its owner in place.
pub fn admin_unlink(store: &dyn Store, caller: &Caller, tag_id: &str) -> Result<Tag> {
    caller.require_admin()?;

    let tag = transact(store, |tx| {
        let mut tag = tx.get_tag(tag_id)?.ok_or(Error::NotFound)?;
        tag.unlink()?;
        binder::unbind(tx, &mut tag)?;
        tx.update_tag(&tag)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, admin_id = %caller.user_id, "admin unlinked tag");
    Ok(tag)
}

/// Gives up ownership of one of the caller's tags.
///
/// A missing tag and a tag owned by someone else produce the same error.
pub fn self_release(store: &dyn Store, caller: &Caller, tag_id: &str) -> Result<Tag> {
    let tag = transact(store, |tx| {
        let mut tag = tx
            .get_tag(tag_id)?
            .filter(|t| t.is_owned_by(&caller.user_id))
            .ok_or(Error::NotFoundOrNotOwned)?;

        binder::unbind(tx, &mut tag)?;
        tag.release();
        tx.update_tag(&tag)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, user_id = %caller.user_id, "released tag");
    Ok(tag)
}

/// Existence, binding kind and status of a tag. Never reveals the owner.
pub fn lookup(store: &dyn Store, key: TagKey<'_>) -> Result<TagSnapshot> {
    let tag = match key {
        TagKey::Code(code) if code.trim().is_empty() => None,
        TagKey::Uid(uid) if uid.trim().is_empty() => None,
        TagKey::Code(code) => store.get_tag_by_code(code.trim())?,
        TagKey::Uid(uid) => store.get_tag_by_uid(uid.trim())?,
    };

    Ok(tag
        .as_ref()
        .map(TagSnapshot::from)
        .unwrap_or_else(TagSnapshot::missing))
}

pub fn list_owned(store: &dyn Store, caller: &Caller) -> Result<Vec<Tag>> {
    store.list_owner_tags(&caller.user_id)
}

/// Registers a new physical tag in the unclaimed pool.
pub fn provision(store: &dyn Store, caller: &Caller, tag_uid: &str, public_code: &str) -> Result<Tag> {
    caller.require_admin()?;

    let tag_uid = tag_uid.trim();
    let public_code = public_code.trim();
    if tag_uid.is_empty() {
        return Err(Error::Validation("tag_uid is required".to_string()));
    }
    validate_public_code(public_code)?;

    let tag = Tag::provision(tag_uid, public_code);
    store.create_tag(&tag)?;

    tracing::info!(tag_id = %tag.id, public_code = %tag.public_code, "provisioned tag");
    Ok(tag)
}

/// Enables or disables claiming for a tag. Current ownership is untouched.
pub fn set_active(store: &dyn Store, caller: &Caller, tag_id: &str, active: bool) -> Result<Tag> {
    caller.require_admin()?;

    let tag = transact(store, |tx| {
        let mut tag = tx.get_tag(tag_id)?.ok_or(Error::NotFound)?;
        tag.is_active = active;
        tx.update_tag(&tag)?;
        Ok(tag)
    })?;

    tracing::info!(tag_id = %tag.id, active, "set tag active flag");
    Ok(tag)
}

const MAX_PUBLIC_CODE_LEN: usize = 32;

fn validate_public_code(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(Error::Validation("public code cannot be empty".to_string()));
    }
    if code.len() > MAX_PUBLIC_CODE_LEN {
        return Err(Error::Validation(format!(
            "public code cannot exceed {MAX_PUBLIC_CODE_LEN} characters"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::Validation(
            "public code can only contain alphanumeric characters and hyphens".to_string(),
        ));
    }
    Ok(())
}
