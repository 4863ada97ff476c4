//! Core of River Bank.
//!
//! The [`Engine`] owns the database connection and exposes:
//!
//! - the credential store (`accounts` table): registration, password hashes,
//!   bucket balances;
//! - the ledger store (`transactions` table): append-only records;
//! - authentication against stored bcrypt hashes;
//! - account actions ([`Action`]): deposit, withdraw and transfer, each
//!   committed atomically together with its ledger records.

pub use accounts::{Account, NewAccount};
pub use auth::{hash_password, verify};
pub use bucket::{Balances, Bucket};
pub use error::EngineError;
pub use ledger::{Record, RecordFilter, RecordKind};
pub use money::Money;
pub use ops::{Action, ActionOutcome, Engine, EngineBuilder};
pub use util::{MIN_PASSWORD_LEN, MIN_USERNAME_LEN, validate_password, validate_username};

pub mod accounts;
pub mod auth;
mod bucket;
mod error;
pub mod ledger;
mod money;
mod ops;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
