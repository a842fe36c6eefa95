pub mod app;
pub mod config;
pub mod error;
pub mod payment_intents;
pub mod readers;
pub mod state;
pub mod stripe;
pub mod validate;
