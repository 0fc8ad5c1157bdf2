pub mod db;
pub mod error;
pub mod export;
pub mod gateway;
pub mod gemini;
pub mod models;
pub mod period;
pub mod prompt;
pub mod service;
pub mod session;
