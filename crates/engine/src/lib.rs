//! Multi-device sync engine for a household ledger.
//!
//! Devices sharing one household store reconcile their offline edits with a
//! pull-then-push cycle:
//!
//! 1. [`Engine::pull`] with the last cursor returns every row changed since,
//!    plus a new cursor.
//! 2. [`Engine::push`] applies the device's dirty rows with last-write-wins
//!    per record and reports conflicts instead of failing.
//!
//! [`Engine::export`] and [`Engine::import`] move the whole store as a
//! versioned [`BackupSnapshot`] for backups, restores and new devices.
//!
//! Collaborators writing to the managed tables go through [`Engine::save`] /
//! [`Engine::delete`], or call [`record_change`] inside their own transaction.

pub use api_types::{
    EntityType,
    backup::{BackupSnapshot, SNAPSHOT_VERSION},
    sync::{
        AppliedIds, AutomationRule, Category, SettingRow, SyncConflict, SyncPullResponse,
        SyncPushPayload, SyncPushResult, SyncStatus, Transaction, User,
    },
    transaction::{TransactionStatus, TransactionType},
};
pub use change_log::{ChangeLogEntry, record_change};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use record::SyncRecord;
pub use schema::{Validate, decode_push, decode_snapshot, validate_push, validate_snapshot};

mod categories;
mod change_log;
mod error;
mod ops;
mod record;
mod rules;
mod schema;
mod settings;
mod sync_meta;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
