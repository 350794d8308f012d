//! SQL schema for the Lineage SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are strictly append-only; ids are assigned as COUNT(*) + 1.
-- parent_ref / spouse_ref hold the reference text verbatim and are not
-- foreign keys: dangling references are legal.
CREATE TABLE IF NOT EXISTS people (
    id          INTEGER PRIMARY KEY,
    name        TEXT    NOT NULL,
    gender      TEXT    NOT NULL,   -- 'male' | 'female'
    birth_year  INTEGER NOT NULL,
    parent_ref  TEXT    NOT NULL DEFAULT '',
    spouse_ref  TEXT    NOT NULL DEFAULT '',
    bio         TEXT    NOT NULL DEFAULT '',
    photo_path  TEXT,
    created_at  TEXT    NOT NULL    -- ISO 8601 UTC; store-assigned
);

PRAGMA user_version = 1;
";
