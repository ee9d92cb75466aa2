//! Password verification implementations.

pub mod password;

pub use password::BcryptPasswordVerifier;
