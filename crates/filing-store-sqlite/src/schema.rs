//! SQL schema for the filing ledger.
//!
//! Created if absent at connection startup and never altered. There are no
//! foreign keys: file items keep their subject code and uploader username as
//! plain text, so deleting a subject never touches them.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category      TEXT NOT NULL,
    role          TEXT NOT NULL,
    name          TEXT NOT NULL DEFAULT '',
    username      TEXT NOT NULL UNIQUE,   -- always lower-case
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    notes         TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS subjects (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    code      TEXT NOT NULL UNIQUE,
    name      TEXT NOT NULL,
    lic       TEXT NOT NULL DEFAULT '',   -- comma separated names
    lic_start TEXT NOT NULL DEFAULT '',   -- free text, not a date
    lic_end   TEXT NOT NULL DEFAULT '',
    rp        TEXT NOT NULL DEFAULT '',
    rp_start  TEXT NOT NULL DEFAULT '',
    rp_end    TEXT NOT NULL DEFAULT ''
);

-- File items are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS file_items (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_code      TEXT NOT NULL,
    uploader_username TEXT NOT NULL,
    role              TEXT NOT NULL,   -- 'LIC' | 'RP' | 'STAFF'
    doc_type          TEXT NOT NULL,
    semester          TEXT NOT NULL,
    path              TEXT NOT NULL,
    sha256            TEXT NOT NULL,
    uploaded_at       TEXT NOT NULL    -- fixed-width RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS users_role_idx          ON users(role);
CREATE INDEX IF NOT EXISTS file_items_subject_idx  ON file_items(subject_code);
CREATE INDEX IF NOT EXISTS file_items_uploader_idx ON file_items(uploader_username);
CREATE INDEX IF NOT EXISTS file_items_uploaded_idx ON file_items(uploaded_at);

PRAGMA user_version = 1;
";
