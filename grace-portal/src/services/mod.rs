pub mod account_service;
pub mod page_service;
pub mod session_service;
