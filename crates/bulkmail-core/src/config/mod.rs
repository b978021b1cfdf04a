//! User configuration: model, flat-file store and advisory validation.

mod model;
mod store;
mod validation;

pub use model::{SenderCredentials, UserConfig, UserId};
pub use store::ConfigStore;
pub use validation::{ValidationError, ValidationResult, validate_config};
