pub mod error;
pub mod log_store;
pub mod migration;

pub(crate) use migration::read_log_as_text;
