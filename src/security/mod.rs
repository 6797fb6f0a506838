pub mod credentials;
pub mod token_manager;

pub use credentials::{load_credentials, Credential};
pub use token_manager::{mask_secrets_in_string, mask_token};
