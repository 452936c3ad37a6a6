mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::{Error, Result};
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Runs `op` inside a single write transaction.
    ///
    /// The transaction commits only if `op` returns `Ok`; any error rolls back
    /// every write made through the handle.
    fn run_in_transaction(&self, op: &mut dyn FnMut(&dyn StoreTx) -> Result<()>) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;
    fn has_admin_token(&self) -> Result<bool>;

    // Tag operations
    fn create_tag(&self, tag: &Tag) -> Result<()>;
    fn get_tag(&self, id: &str) -> Result<Option<Tag>>;
    fn get_tag_by_code(&self, public_code: &str) -> Result<Option<Tag>>;
    fn get_tag_by_uid(&self, tag_uid: &str) -> Result<Option<Tag>>;
    fn list_tags(&self, cursor: &str, limit: i32) -> Result<Vec<Tag>>;
    fn list_owner_tags(&self, owner_id: &str) -> Result<Vec<Tag>>;

    // Module operations
    fn create_module(&self, module: &Module) -> Result<()>;
    fn create_card(&self, card: &Card) -> Result<()>;
    fn get_module(&self, module: &ModuleRef) -> Result<Option<Module>>;
    fn get_card(&self, id: &str) -> Result<Option<Card>>;
    fn increment_card_views(&self, id: &str) -> Result<Option<i64>>;

    // Connection operations
    fn list_user_connections(&self, user_id: &str) -> Result<Vec<Connection>>;
    fn find_connection(
        &self,
        user_id: &str,
        target: &ConnectionTarget,
    ) -> Result<Option<Connection>>;
}

/// Reads and writes available inside a transaction opened by
/// [`Store::run_in_transaction`].
pub trait StoreTx {
    fn get_user(&self, id: &str) -> Result<Option<User>>;

    fn get_tag(&self, id: &str) -> Result<Option<Tag>>;
    fn get_tag_by_code(&self, public_code: &str) -> Result<Option<Tag>>;
    /// Writes the mutable tag state: owner, binding, status, claim time and active flag.
    fn update_tag(&self, tag: &Tag) -> Result<()>;

    fn get_module(&self, module: &ModuleRef) -> Result<Option<Module>>;
    fn set_module_tag(&self, module: &ModuleRef, tag_id: Option<&str>) -> Result<()>;
    /// Clears the back-reference on every module of every kind that points at `tag_id`.
    fn detach_modules(&self, tag_id: &str) -> Result<usize>;

    fn get_connection(&self, id: &str) -> Result<Option<Connection>>;
    fn find_connection(
        &self,
        user_id: &str,
        target: &ConnectionTarget,
    ) -> Result<Option<Connection>>;
    fn insert_connection(&self, connection: &Connection) -> Result<()>;
    fn delete_connection(&self, id: &str) -> Result<bool>;
}

/// Runs `op` in a store transaction and hands back its result.
pub fn transact<T, F>(store: &dyn Store, op: F) -> Result<T>
where
    F: FnOnce(&dyn StoreTx) -> Result<T>,
{
    let mut op = Some(op);
    let mut output = None;

    store.run_in_transaction(&mut |tx| {
        if let Some(op) = op.take() {
            output = Some(op(tx)?);
        }
        Ok(())
    })?;

    output.ok_or_else(|| Error::Internal("transaction completed without a result".to_string()))
}
