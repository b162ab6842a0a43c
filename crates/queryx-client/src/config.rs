//! Client configuration.

use std::time::Duration;

/// Default base URL of the QueryX API server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable consulted by the consoles for the API base URL.
pub const API_URL_ENV: &str = "QUERYX_API_URL";

/// REST endpoint paths, relative to the base URL.
pub mod endpoints {
    /// Execute a raw SQL query (`POST`, SQL in the `query` parameter).
    pub const EXECUTE_QUERY: &str = "/query/execute";
    /// Translate and execute a natural-language query (`POST`).
    pub const AI_QUERY: &str = "/query/ai-query";

    /// List table names (`GET`).
    pub const GET_ALL_TABLES: &str = "/schema/tables";
    /// Schemas of every table (`GET`).
    pub const GET_ALL_TABLES_SCHEMA: &str = "/schema/tablesSchema";
    /// Schema of one table (`GET`, table name appended as a path segment).
    pub const GET_TABLE_SCHEMA: &str = "/schema";
    /// Create a table (`POST`).
    pub const CREATE_TABLE: &str = "/schema/create";
    /// Replace a table's columns (`POST`).
    pub const UPDATE_TABLE: &str = "/schema/update";
    /// Drop a table (`DELETE`, table name appended as a path segment).
    pub const DELETE_TABLE: &str = "/schema/delete";

    /// Insert rows into a table (`POST`).
    pub const INSERT_DATA: &str = "/tabledata/insert";
}

/// Sample inputs offered by the consoles' query views.
pub mod examples {
    /// Example SQL statements.
    pub const SQL: &[&str] = &[
        "SELECT * FROM users LIMIT 10",
        "SELECT COUNT(*) FROM orders WHERE status = 'active'",
        "SELECT u.name, COUNT(o.id) as order_count FROM users u LEFT JOIN orders o ON u.id = o.user_id GROUP BY u.name",
    ];

    /// Example natural-language questions.
    pub const AI: &[&str] = &[
        "Show me all users who registered in the last 30 days",
        "What are the top 10 products by sales?",
        "Find all orders with amounts greater than $1000",
        "List customers who have never made a purchase",
    ];
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server (e.g., "http://127.0.0.1:8080").
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    /// Create a configuration for a server on localhost.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

fn default_user_agent() -> String {
    format!("queryx-client/{}", env!("CARGO_PKG_VERSION"))
}
