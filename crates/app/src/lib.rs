//! Farmstall persistence and order services over `PostgreSQL`.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;
pub mod retry;

#[cfg(test)]
mod test;
