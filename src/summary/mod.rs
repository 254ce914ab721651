pub mod error;
pub mod forecast_summary;
