pub mod academics_service;
pub mod auth;
pub mod billing_service;
pub mod import_service;
pub mod recurrence_service;
pub mod reports_service;
pub mod sequence;
pub mod statement_service;
