use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, TransactionBehavior, params,
};

use super::schema::SCHEMA;
use super::{Store, StoreTx};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Enums stored as their lowercase text name.
macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::parse(s).ok_or_else(|| {
                    FromSqlError::Other(format!("invalid {} value: {s}", stringify!($ty)).into())
                })
            }
        }
    };
}

text_column!(Role);
text_column!(TagStatus);
text_column!(ModuleKind);
text_column!(ConnectionStatus);
text_column!(Visibility);

const USER_COLUMNS: &str = "id, name, role, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        updated_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at";

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        user_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

const TAG_COLUMNS: &str = "id, tag_uid, public_code, owner_id, module_type, module_id, status, claimed_at, is_active, created_at";

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    let kind: Option<ModuleKind> = row.get(4)?;
    let module_id: Option<String> = row.get(5)?;

    Ok(Tag {
        id: row.get(0)?,
        tag_uid: row.get(1)?,
        public_code: row.get(2)?,
        owner_id: row.get(3)?,
        binding: kind.zip(module_id).map(|(kind, id)| ModuleRef { kind, id }),
        status: row.get(6)?,
        claimed_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
        is_active: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

const MODULE_COLUMNS: &str = "id, owner_id, title, tag_id, created_at";

fn module_from_row(kind: ModuleKind, row: &Row<'_>) -> rusqlite::Result<Module> {
    Ok(Module {
        id: row.get(0)?,
        kind,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        tag_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

const CARD_COLUMNS: &str = "id, owner_id, title, tag_id, password, level1_password, level2_password, view_count, created_at";

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        tag_id: row.get(3)?,
        password: row.get(4)?,
        level1_password: row.get(5)?,
        level2_password: row.get(6)?,
        view_count: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const CONNECTION_COLUMNS: &str = "id, user_id, card_id, friend_id, status, visibility, created_at";

fn connection_from_row(row: &Row<'_>) -> rusqlite::Result<Connection_> {
    let card_id: Option<String> = row.get(2)?;
    let friend_id: Option<String> = row.get(3)?;

    let target = match (card_id, friend_id) {
        (Some(card_id), None) => ConnectionTarget::Card(card_id),
        (None, Some(friend_id)) => ConnectionTarget::Friend(friend_id),
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                "connection must have exactly one of card_id or friend_id".into(),
            ));
        }
    };

    Ok(Connection_ {
        id: row.get(0)?,
        user_id: row.get(1)?,
        target,
        status: row.get(4)?,
        visibility: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

/// The saved-contact model, aliased to keep it apart from `rusqlite::Connection`.
type Connection_ = crate::types::Connection;

fn target_columns(target: &ConnectionTarget) -> (Option<&str>, Option<&str>) {
    match target {
        ConnectionTarget::Card(id) => (Some(id.as_str()), None),
        ConnectionTarget::Friend(id) => (None, Some(id.as_str())),
    }
}

impl StoreTx for Connection {
    fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        self.query_row(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1"),
            params![id],
            tag_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_tag_by_code(&self, public_code: &str) -> Result<Option<Tag>> {
        self.query_row(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE public_code = ?1"),
            params![public_code],
            tag_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_tag(&self, tag: &Tag) -> Result<()> {
        let rows = self.execute(
            "UPDATE tags SET owner_id = ?1, module_type = ?2, module_id = ?3, status = ?4,
                 claimed_at = ?5, is_active = ?6
             WHERE id = ?7",
            params![
                tag.owner_id,
                tag.binding.as_ref().map(|b| b.kind),
                tag.binding.as_ref().map(|b| b.id.as_str()),
                tag.status,
                tag.claimed_at.as_ref().map(format_datetime),
                tag.is_active,
                tag.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn get_module(&self, module: &ModuleRef) -> Result<Option<Module>> {
        let kind = module.kind;
        self.query_row(
            &format!("SELECT {MODULE_COLUMNS} FROM {} WHERE id = ?1", kind.table()),
            params![module.id],
            |row| module_from_row(kind, row),
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_module_tag(&self, module: &ModuleRef, tag_id: Option<&str>) -> Result<()> {
        let rows = self.execute(
            &format!("UPDATE {} SET tag_id = ?1 WHERE id = ?2", module.kind.table()),
            params![tag_id, module.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn detach_modules(&self, tag_id: &str) -> Result<usize> {
        let mut detached = 0;
        for kind in ModuleKind::ALL {
            detached += self.execute(
                &format!("UPDATE {} SET tag_id = NULL WHERE tag_id = ?1", kind.table()),
                params![tag_id],
            )?;
        }
        Ok(detached)
    }

    fn get_connection(&self, id: &str) -> Result<Option<Connection_>> {
        self.query_row(
            &format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1"),
            params![id],
            connection_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_connection(
        &self,
        user_id: &str,
        target: &ConnectionTarget,
    ) -> Result<Option<Connection_>> {
        let (column, value) = match target {
            ConnectionTarget::Card(id) => ("card_id", id),
            ConnectionTarget::Friend(id) => ("friend_id", id),
        };

        self.query_row(
            &format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections WHERE user_id = ?1 AND {column} = ?2"
            ),
            params![user_id, value],
            connection_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn insert_connection(&self, connection: &Connection_) -> Result<()> {
        let (card_id, friend_id) = target_columns(&connection.target);
        let result = self.execute(
            &format!(
                "INSERT INTO connections ({CONNECTION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ),
            params![
                connection.id,
                connection.user_id,
                card_id,
                friend_id,
                connection.status,
                connection.visibility,
                format_datetime(&connection.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_connection(&self, id: &str) -> Result<bool> {
        let rows = self.execute("DELETE FROM connections WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn run_in_transaction(&self, op: &mut dyn FnMut(&dyn StoreTx) -> Result<()>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping the transaction without commit rolls it back.
        op(&*tx)?;

        tx.commit()?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                user.id,
                user.name,
                user.role,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        StoreTx::get_user(&*self.conn(), id)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_admin_token(&self) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM tokens t JOIN users u ON u.id = t.user_id WHERE u.role = 'admin'
             )",
            [],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // Tag operations

    fn create_tag(&self, tag: &Tag) -> Result<()> {
        let result = self.conn().execute(
            &format!(
                "INSERT INTO tags ({TAG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                tag.id,
                tag.tag_uid,
                tag.public_code,
                tag.owner_id,
                tag.binding.as_ref().map(|b| b.kind),
                tag.binding.as_ref().map(|b| b.id.as_str()),
                tag.status,
                tag.claimed_at.as_ref().map(format_datetime),
                tag.is_active,
                format_datetime(&tag.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        StoreTx::get_tag(&*self.conn(), id)
    }

    fn get_tag_by_code(&self, public_code: &str) -> Result<Option<Tag>> {
        StoreTx::get_tag_by_code(&*self.conn(), public_code)
    }

    fn get_tag_by_uid(&self, tag_uid: &str) -> Result<Option<Tag>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE tag_uid = ?1"),
            params![tag_uid],
            tag_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tags(&self, cursor: &str, limit: i32) -> Result<Vec<Tag>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], tag_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_owner_tags(&self, owner_id: &str) -> Result<Vec<Tag>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE owner_id = ?1 ORDER BY claimed_at DESC"
        ))?;

        let rows = stmt.query_map(params![owner_id], tag_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Module operations

    fn create_module(&self, module: &Module) -> Result<()> {
        let result = self.conn().execute(
            &format!(
                "INSERT INTO {} ({MODULE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)",
                module.kind.table()
            ),
            params![
                module.id,
                module.owner_id,
                module.title,
                module.tag_id,
                format_datetime(&module.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn create_card(&self, card: &Card) -> Result<()> {
        let result = self.conn().execute(
            &format!("INSERT INTO cards ({CARD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                card.id,
                card.owner_id,
                card.title,
                card.tag_id,
                card.password,
                card.level1_password,
                card.level2_password,
                card.view_count,
                format_datetime(&card.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_module(&self, module: &ModuleRef) -> Result<Option<Module>> {
        StoreTx::get_module(&*self.conn(), module)
    }

    fn get_card(&self, id: &str) -> Result<Option<Card>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
            params![id],
            card_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn increment_card_views(&self, id: &str) -> Result<Option<i64>> {
        let conn = self.conn();
        conn.query_row(
            "UPDATE cards SET view_count = view_count + 1 WHERE id = ?1 RETURNING view_count",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    // Connection operations

    fn list_user_connections(&self, user_id: &str) -> Result<Vec<Connection_>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE user_id = ?1
             ORDER BY created_at DESC, id"
        ))?;

        let rows = stmt.query_map(params![user_id], connection_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn find_connection(
        &self,
        user_id: &str,
        target: &ConnectionTarget,
    ) -> Result<Option<Connection_>> {
        StoreTx::find_connection(&*self.conn(), user_id, target)
    }
}
