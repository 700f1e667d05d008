pub mod academics;
pub mod auth;
pub mod billing;
pub mod clients;
pub mod reports;
pub mod settings;
pub mod students;
