pub mod academics;
pub mod auth;
pub mod billing;
pub mod clients;
pub mod import;
pub mod recurring;
pub mod reports;
pub mod settings;
pub mod students;
