//! HTTP API for the panel anchor service

mod error;
mod rest;

pub use error::*;
pub use rest::*;
