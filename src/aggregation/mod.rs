pub mod daily_aggregate;
pub mod error;
