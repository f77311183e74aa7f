//! Authentication core: credential validation, hashing, the user
//! directory contract, and the session gate.
//!
//! The modules here are usable without the HTTP layer. Flows take the
//! database pool and an explicit [`SessionContext`]; nothing in this tree
//! reads or writes process-global state.
//!
//! ## Expected outcomes vs faults
//!
//! Rejections a user can correct (missing fields, weak password, taken
//! username, unknown username, wrong password) come back as outcome enums.
//! Anything else (directory unreachable, hasher failure) is an
//! `anyhow::Error` for the caller's fault boundary; nothing in this tree
//! retries.

pub mod directory;
pub mod hasher;
pub mod login;
pub mod policy;
pub mod register;
pub mod session;

pub use directory::Identity;
pub use login::{login, logout, LoginDenied, LoginOutcome};
pub use register::{register, RegisterDenied, RegisterOutcome};
pub use session::{gate, Gate, GateMode, SessionContext};
