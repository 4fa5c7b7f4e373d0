pub mod google;
pub mod oauth;
pub mod provider;
pub mod session;
pub mod session_file;
pub mod token_store;

pub use google::GoogleIdentity;
pub use provider::IdentityProvider;
pub use session::{Session, SessionIdentity};
