//! Postgres Adapter
//!
//! Token and trade persistence on sqlx.

mod repository;
mod rows;

pub use repository::{PgConfig, PgTokenRepository};
pub use rows::{TokenRow, TradeRow};
