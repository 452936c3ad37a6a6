use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::store::{SqliteStore, Store};
use crate::types::{Caller, Card, Module, ModuleKind, ModuleRef, Role, Tag, User};

/// A fresh database with helpers for seeding users, tags and modules.
pub struct Fixture {
    pub store: SqliteStore,
    _temp: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        Self { store, _temp: temp }
    }

    fn create_user(&self, id: &str, role: Role) -> Caller {
        self.store
            .create_user(&User {
                id: id.to_string(),
                name: id.to_string(),
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();
        Caller::new(id, role)
    }

    pub fn user(&self, id: &str) -> Caller {
        self.create_user(id, Role::User)
    }

    pub fn admin(&self, id: &str) -> Caller {
        self.create_user(id, Role::Admin)
    }

    pub fn tag(&self, public_code: &str) -> Tag {
        let tag = Tag::provision(format!("uid-{public_code}"), public_code);
        self.store.create_tag(&tag).unwrap();
        tag
    }

    pub fn module(&self, kind: ModuleKind, owner_id: &str) -> ModuleRef {
        let module = Module {
            id: Uuid::new_v4().to_string(),
            kind,
            owner_id: owner_id.to_string(),
            title: format!("{kind} module"),
            tag_id: None,
            created_at: Utc::now(),
        };
        self.store.create_module(&module).unwrap();
        module.module_ref()
    }

    pub fn card(
        &self,
        owner_id: &str,
        password: Option<&str>,
        level1: Option<&str>,
        level2: Option<&str>,
    ) -> ModuleRef {
        let card = Card {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: "Business card".to_string(),
            tag_id: None,
            password: password.map(str::to_string),
            level1_password: level1.map(str::to_string),
            level2_password: level2.map(str::to_string),
            view_count: 0,
            created_at: Utc::now(),
        };
        self.store.create_card(&card).unwrap();
        ModuleRef::new(ModuleKind::Card, card.id)
    }
}
