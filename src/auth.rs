//! Auth-domain identifiers, scope lists, redacted secrets, and issued token sets.

pub mod id;
pub mod scope;
pub mod secret;
pub mod token;

pub use id::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
