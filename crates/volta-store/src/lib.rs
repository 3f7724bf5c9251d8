//! # volta-store: Document Store Layer for Volta
//!
//! Schemaless collections of JSON documents behind one async trait.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          volta-store                                    │
//! │                                                                         │
//! │   volta-sync services                                                   │
//! │          │  Arc<dyn DocumentStore>                                      │
//! │          ▼                                                              │
//! │   ┌──────────────────┐                                                  │
//! │   │  DocumentStore   │  get · scan · query · commit · subscribe         │
//! │   └───────┬──────────┘                                                  │
//! │           │                                                             │
//! │     ┌─────┴───────────────┐                                             │
//! │     ▼                     ▼                                             │
//! │  MemoryStore          SqliteStore                                       │
//! │  (tests, demos,       (documents table,                                 │
//! │   offline switch)      WAL, migrations)                                 │
//! │     │                     │                                             │
//! │     └──────► ChangeHub ◄──┘   broadcast per collection                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Document, Write, Query, ChangeEvent
//! - [`store`] - The `DocumentStore` trait
//! - [`hub`] - Change streams
//! - [`memory`] - In-memory adapter
//! - [`sqlite`] - SQLite adapter
//! - [`pool`] - SQLite pool configuration
//! - [`migrations`] - Embedded migrations
//! - [`error`] - Store error types

pub mod document;
pub mod error;
pub mod hub;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod sqlite;
pub mod store;

pub use document::{encode, field, ChangeEvent, Direction, Document, Query, Write};
pub use error::{StoreError, StoreResult};
pub use hub::{ChangeHub, StreamItem, Subscription};
pub use memory::MemoryStore;
pub use pool::DbConfig;
pub use sqlite::SqliteStore;
pub use store::DocumentStore;
