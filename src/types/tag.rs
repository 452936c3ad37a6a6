use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ModuleKind, ModuleRef};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStatus {
    /// Freshly provisioned, or reset by an administrator.
    Unclaimed,
    Claimed,
    /// Released by its former owner.
    Available,
}

impl TagStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TagStatus::Unclaimed => "unclaimed",
            TagStatus::Claimed => "claimed",
            TagStatus::Available => "available",
        }
    }

    pub fn parse(s: &str) -> Option<TagStatus> {
        match s {
            "unclaimed" => Some(TagStatus::Unclaimed),
            "claimed" => Some(TagStatus::Claimed),
            "available" => Some(TagStatus::Available),
            _ => None,
        }
    }
}

impl fmt::Display for TagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical NFC tag and its claim/binding state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    /// Hardware identifier read from the chip.
    pub tag_uid: String,
    pub public_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ModuleRef>,
    pub status: TagStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// A newly provisioned tag: unowned, unbound, active.
    pub fn provision(tag_uid: impl Into<String>, public_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag_uid: tag_uid.into(),
            public_code: public_code.into(),
            owner_id: None,
            binding: None,
            status: TagStatus::Unclaimed,
            claimed_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    #[must_use]
    pub fn module_kind(&self) -> Option<ModuleKind> {
        self.binding.as_ref().map(|b| b.kind)
    }

    /// Establishes ownership on a free tag. The binding is left untouched.
    pub fn claim(&mut self, owner_id: &str, now: DateTime<Utc>) -> Result<()> {
        if self.owner_id.is_some() {
            return Err(Error::AlreadyClaimed);
        }
        if !self.is_active {
            return Err(Error::Validation("tag is deactivated".to_string()));
        }
        self.owner_id = Some(owner_id.to_string());
        self.status = TagStatus::Claimed;
        self.claimed_at = Some(now);
        Ok(())
    }

    /// Administrative reset back to the provisioning pool.
    pub fn reset_unclaimed(&mut self) {
        self.clear_ownership();
        self.status = TagStatus::Unclaimed;
    }

    /// Owner-initiated release.
    pub fn release(&mut self) {
        self.clear_ownership();
        self.status = TagStatus::Available;
    }

    /// Drops the content binding but keeps the owner.
    pub fn unlink(&mut self) -> Result<()> {
        if self.owner_id.is_none() {
            return Err(Error::Validation("tag is not claimed".to_string()));
        }
        self.binding = None;
        self.status = TagStatus::Claimed;
        Ok(())
    }

    fn clear_ownership(&mut self) {
        self.owner_id = None;
        self.binding = None;
        self.claimed_at = None;
    }
}

/// Public view of a tag: no owner identity, only what an anonymous scanner may learn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSnapshot {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_owner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<ModuleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TagStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl TagSnapshot {
    #[must_use]
    pub fn missing() -> Self {
        Self {
            exists: false,
            has_owner: None,
            module_type: None,
            status: None,
            active: None,
        }
    }
}

impl From<&Tag> for TagSnapshot {
    fn from(tag: &Tag) -> Self {
        Self {
            exists: true,
            has_owner: Some(tag.owner_id.is_some()),
            module_type: tag.module_kind(),
            status: Some(tag.status),
            active: Some(tag.is_active),
        }
    }
}
