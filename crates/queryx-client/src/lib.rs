//! QueryX Client - Client library for the QueryX database administration API.
//!
//! This crate wraps the REST contract exposed by a QueryX backend: table
//! listing, schema management, row insertion, raw SQL execution and
//! natural-language ("AI") queries. It also carries the form state the
//! consoles build requests from, so the browser studio and the terminal CLI
//! validate and coerce user input the same way.
//!
//! # Quick Start
//!
//! ```ignore
//! use queryx_client::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("http://127.0.0.1:8080"))?;
//!
//!     for table in client.list_tables().await? {
//!         println!("{table}");
//!     }
//!
//!     let result = client.execute_sql("SELECT * FROM users LIMIT 10").await?;
//!     println!("{} row(s) in {}ms", result.row_count(), result.execution_time_ms());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod forms;
pub mod schema;

pub use client::Client;
pub use config::ClientConfig;
pub use envelope::{Envelope, QueryResult};
pub use error::Error;
pub use forms::{coerce, CellValue, ColumnDraft, RowBuffer, RowForm, TableForm};
pub use schema::{ColumnDefinition, ColumnInfo, DataType, InputKind, SchemaSummary, TableSchema};

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, Error>;
