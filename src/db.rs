pub mod user_repo;
pub use user_repo::UserRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod student_repo;
pub use student_repo::StudentRepository;
pub mod academics_repo;
pub use academics_repo::AcademicsRepository;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
pub mod reports_repo;
pub use reports_repo::ReportsRepository;
