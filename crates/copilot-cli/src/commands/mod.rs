pub mod chat;
pub mod config;
pub mod credentials;
pub mod key;
