// Utility modules

pub mod service_error;
pub mod validation;

pub use service_error::ServiceError;
pub use validation::{non_blank_field, trim_optional_field};
