pub mod forecast;
pub mod location;
pub mod log_schema;
pub mod observation;
