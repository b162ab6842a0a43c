pub mod dashboard;
pub mod data;
pub mod health;
pub mod query;
pub mod tables;
