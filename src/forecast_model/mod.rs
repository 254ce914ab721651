pub mod error;
pub mod evaluation;
pub mod features;
pub mod predictor;
pub mod regression;
