//! First-run default data.
//!
//! # Invariants
//! - Seeding is idempotent: existing users/categories are left untouched.

use super::DbResult;
use log::info;
use rusqlite::{params, Connection};

/// Username of the administrator account created by [`seed_defaults`].
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// `(name, description, color)` rows inserted by [`seed_defaults`].
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Development", "Technical terms used by engineering", "#e74c3c"),
    ("Marketing", "Marketing and sales terms", "#2ecc71"),
    ("Finance", "Finance and accounting terms", "#f39c12"),
    ("General", "Terms shared across the company", "#3498db"),
];

/// Inserts the default admin user and starter categories.
///
/// Runs in one transaction; rows that already exist by unique name are skipped.
pub fn seed_defaults(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    let admin_inserted = tx.execute(
        "INSERT OR IGNORE INTO users (username, role) VALUES (?1, 'admin');",
        [DEFAULT_ADMIN_USERNAME],
    )?;

    let mut categories_inserted = 0;
    for (name, description, color) in DEFAULT_CATEGORIES {
        categories_inserted += tx.execute(
            "INSERT OR IGNORE INTO categories (name, description, color) VALUES (?1, ?2, ?3);",
            params![name, description, color],
        )?;
    }
    tx.commit()?;

    info!(
        "event=db_seed module=db status=ok admin_inserted={} categories_inserted={}",
        admin_inserted, categories_inserted
    );
    Ok(())
}
