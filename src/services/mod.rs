pub mod blob_service;
pub mod dashboard_service;
pub mod hireflix_service;
pub mod lifecycle_service;
