//! Password gates on a card's public view.
//!
//! Card passwords are stored in plaintext and scoped to the card; they have
//! nothing to do with API tokens.

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::Card;

/// Capability tier unlocked by a tiered password. Level 2 includes level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Level1,
    Level2,
}

impl AccessLevel {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            AccessLevel::Level1 => 1,
            AccessLevel::Level2 => 2,
        }
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Which gates a card has configured, without the secrets themselves.
#[derive(Debug, Clone, Serialize)]
pub struct GateInfo {
    pub card_id: String,
    pub password_required: bool,
    pub tiered: bool,
}

/// Constant-time comparison against an optional stored secret.
/// An unset secret never matches, not even the empty string.
///
/// The loop always walks the whole input, so timing depends only on what the
/// caller sent, never on the stored secret's length.
fn secret_matches(stored: Option<&str>, input: &str) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    let stored = stored.as_bytes();

    let mut diff = u8::from(stored.len() != input.len());
    for (i, b) in input.bytes().enumerate() {
        diff |= stored.get(i).copied().unwrap_or(0) ^ b;
    }
    diff == 0
}

/// Highest tier `input` unlocks on `card`, if any.
///
/// Both tiers are always compared; level 2 wins when both match.
#[must_use]
pub fn evaluate_tiers(card: &Card, input: &str) -> Option<AccessLevel> {
    let level2 = secret_matches(card.level2_password.as_deref(), input);
    let level1 = secret_matches(card.level1_password.as_deref(), input);

    if level2 {
        Some(AccessLevel::Level2)
    } else if level1 {
        Some(AccessLevel::Level1)
    } else {
        None
    }
}

fn load_card(store: &dyn Store, card_id: &str) -> Result<Card> {
    store.get_card(card_id)?.ok_or(Error::NotFound)
}

/// Checks `password` against the card's basic viewer password.
pub fn verify_basic(store: &dyn Store, card_id: &str, password: &str) -> Result<()> {
    let card = load_card(store, card_id)?;

    if secret_matches(card.password.as_deref(), password) {
        Ok(())
    } else {
        tracing::debug!(card_id, "basic password rejected");
        Err(Error::WrongPassword)
    }
}

/// Checks `password` against the card's tier passwords and reports the tier unlocked.
pub fn verify_tiered(store: &dyn Store, card_id: &str, password: &str) -> Result<AccessLevel> {
    let card = load_card(store, card_id)?;

    evaluate_tiers(&card, password).ok_or_else(|| {
        tracing::debug!(card_id, "tier password rejected");
        Error::WrongPassword
    })
}

pub fn gate_info(store: &dyn Store, card_id: &str) -> Result<GateInfo> {
    let card = load_card(store, card_id)?;

    Ok(GateInfo {
        password_required: card.password.is_some(),
        tiered: card.level1_password.is_some() || card.level2_password.is_some(),
        card_id: card.id,
    })
}

/// Counts one public view of the card and returns the new total.
pub fn record_view(store: &dyn Store, card_id: &str) -> Result<i64> {
    store.increment_card_views(card_id)?.ok_or(Error::NotFound)
}
