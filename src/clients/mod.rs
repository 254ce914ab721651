pub mod error;
pub mod open_weather_client;
pub mod weather_source;
