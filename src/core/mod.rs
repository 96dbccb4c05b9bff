pub mod account;
pub mod booking;
pub mod catalog;
pub mod custom_service;
pub mod steps;

#[cfg(test)]
pub(crate) mod fake_api;

pub use crate::utils::error::Result;
