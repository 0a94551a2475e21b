// Authentication module
// JWT bearer tokens carrying admin capabilities

pub mod error;
pub mod middleware;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{PriceManager, MANAGE_PRICES};
pub use token::{Claims, TokenService};
