use crate::error::ClientError;

/// Sign-in capability. Implementations only ever report an email address;
/// tokens and scopes stay behind this boundary.
pub trait IdentityProvider {
    /// Interactive sign-in including the mail scope grant. Returns the
    /// signed-in email.
    fn sign_in(&self) -> Result<String, ClientError>;

    /// Resume a previous session without user interaction. `Ok(None)` when
    /// there is nothing to resume.
    fn restore(&self) -> Result<Option<String>, ClientError>;

    fn sign_out(&self) -> Result<(), ClientError>;
}
