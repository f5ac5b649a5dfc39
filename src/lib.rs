pub mod auth;
pub mod client;
pub mod decode;
pub mod error;
pub mod models;
pub mod runner;
pub mod scenarios;
pub mod settings;
pub mod stories;

pub use client::{ApiClient, ApiResponse};
pub use error::{HarnessError, Result};
pub use runner::{Suite, SuiteReport};
pub use scenarios::Scenario;
pub use settings::{FixtureMode, Settings};
