pub mod connection;
pub mod usecase;
pub mod validation;
