//! User identity repository.
//!
//! # Responsibility
//! - Resolve users for history/term annotations.
//! - Create users on first login and toggle roles.
//!
//! # Invariants
//! - Usernames are unique and compared case-sensitively.
//! - Users are never deleted through this module.
//! - No authorization is enforced here; callers gate admin-only calls.

use crate::model::user::{normalize_username, User, UserId, UserRole};
use crate::repo::ensure_tables;
use crate::repo::term_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, role, created_at FROM users";

/// Repository interface for the identity collaborator.
pub trait UserRepository {
    /// Returns the user with `username`, creating it with role `user` if absent.
    fn get_or_create_user(&self, username: &str) -> RepoResult<User>;
    /// Display name of a user id; `None` when it does not resolve.
    fn resolve_user(&self, id: UserId) -> RepoResult<Option<String>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// All users ordered by username.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn set_user_role(&self, id: UserId, role: UserRole) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl SqliteUserRepository<'_> {
    fn find_user(&self, column: &'static str, value: Value) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_or_create_user(&self, username: &str) -> RepoResult<User> {
        let username = normalize_username(username)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1);",
            [username.as_str()],
        )?;

        let user = self
            .find_user("username", Value::Text(username))?
            .ok_or_else(|| RepoError::InvalidData("user missing after insert".to_string()))?;

        if inserted > 0 {
            info!(
                "event=user_create module=repo status=ok user_id={}",
                user.id
            );
        }
        Ok(user)
    }

    fn resolve_user(&self, id: UserId) -> RepoResult<Option<String>> {
        let username = self
            .conn
            .query_row("SELECT username FROM users WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(username)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_user("id", Value::Integer(id))
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY username ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn set_user_role(&self, id: UserId, role: UserRole) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET role = ?2 WHERE id = ?1;",
            params![id, role.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        info!(
            "event=user_role_set module=repo status=ok user_id={} role={}",
            id,
            role.as_str()
        );
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        role,
        created_at: row.get("created_at")?,
    })
}
