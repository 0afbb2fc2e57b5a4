pub mod trend;
pub mod login;
pub mod account_repo;
pub mod plaza_service;
pub mod prediction;
