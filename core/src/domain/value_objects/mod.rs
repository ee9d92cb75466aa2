//! Value objects derived from domain state.

pub mod jwks;

pub use jwks::{Jwk, Jwks};
