pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;

pub use adapters::{http::ApiClient, storage::FileSessionStore};
pub use config::AppConfig;
pub use core::{
    account::AccountWorkflow, booking::BookingWorkflow, catalog::Catalog,
    custom_service::CustomServiceWorkflow,
};
pub use domain::auth::Session;
pub use domain::form::{BookingFormInput, CustomServiceFormInput};
pub use utils::error::{BookingError, Result};
