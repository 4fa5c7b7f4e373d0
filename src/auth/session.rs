use log::{info, warn};

use crate::auth::provider::IdentityProvider;
use crate::error::ClientError;

/// What the rest of the app may know about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub is_authenticated: bool,
    pub email: String,
}

impl SessionIdentity {
    fn authenticated(email: String) -> Self {
        Self {
            is_authenticated: true,
            email,
        }
    }
}

/// Owns the identity; views get read-only snapshots.
pub struct Session<P: IdentityProvider> {
    provider: P,
    identity: SessionIdentity,
}

impl<P: IdentityProvider> Session<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            identity: SessionIdentity::default(),
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated
    }

    pub fn sign_in(&mut self) -> Result<&SessionIdentity, ClientError> {
        match self.provider.sign_in() {
            Ok(email) if !email.is_empty() => {
                info!("signed in as {email}");
                self.identity = SessionIdentity::authenticated(email);
                Ok(&self.identity)
            }
            Ok(_) => {
                self.identity = SessionIdentity::default();
                Err(ClientError::Auth("provider returned no email".into()))
            }
            Err(e) => {
                self.identity = SessionIdentity::default();
                Err(e)
            }
        }
    }

    /// Any failure, or no previous user, leaves the session signed out.
    pub fn restore(&mut self) -> &SessionIdentity {
        self.identity = match self.provider.restore() {
            Ok(Some(email)) if !email.is_empty() => {
                info!("restored session for {email}");
                SessionIdentity::authenticated(email)
            }
            Ok(_) => SessionIdentity::default(),
            Err(e) => {
                warn!("could not restore session: {e}");
                SessionIdentity::default()
            }
        };
        &self.identity
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.provider.sign_out() {
            warn!("sign-out cleanup failed: {e}");
        }
        self.identity = SessionIdentity::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Scripted {
        sign_in: Result<String, ClientError>,
        restore: Result<Option<String>, ClientError>,
        signed_out: Cell<bool>,
    }

    impl Scripted {
        fn new(
            sign_in: Result<String, ClientError>,
            restore: Result<Option<String>, ClientError>,
        ) -> Self {
            Self {
                sign_in,
                restore,
                signed_out: Cell::new(false),
            }
        }
    }

    impl IdentityProvider for Scripted {
        fn sign_in(&self) -> Result<String, ClientError> {
            self.sign_in.clone()
        }

        fn restore(&self) -> Result<Option<String>, ClientError> {
            self.restore.clone()
        }

        fn sign_out(&self) -> Result<(), ClientError> {
            self.signed_out.set(true);
            Err(ClientError::Auth("keyring locked".into()))
        }
    }

    #[test]
    fn starts_signed_out() {
        let s = Session::new(Scripted::new(Ok("a@x.com".into()), Ok(None)));
        assert_eq!(s.identity(), &SessionIdentity::default());
    }

    #[test]
    fn sign_in_sets_email() {
        let mut s = Session::new(Scripted::new(Ok("a@x.com".into()), Ok(None)));
        let id = s.sign_in().unwrap();
        assert!(id.is_authenticated);
        assert_eq!(id.email, "a@x.com");
    }

    #[test]
    fn scope_grant_failure_never_authenticates() {
        let mut s = Session::new(Scripted::new(
            Err(ClientError::Auth("gmail.modify not granted".into())),
            Ok(None),
        ));
        assert!(s.sign_in().is_err());
        assert!(!s.is_authenticated());
        assert!(s.identity().email.is_empty());
    }

    #[test]
    fn empty_email_is_not_a_sign_in() {
        let mut s = Session::new(Scripted::new(Ok(String::new()), Ok(None)));
        assert!(matches!(s.sign_in(), Err(ClientError::Auth(_))));
        assert!(!s.is_authenticated());
    }

    #[test]
    fn restore_outcomes() {
        let mut s = Session::new(Scripted::new(Ok("x".into()), Ok(Some("b@x.com".into()))));
        assert!(s.restore().is_authenticated);

        let mut s = Session::new(Scripted::new(Ok("x".into()), Ok(None)));
        assert_eq!(s.restore(), &SessionIdentity::default());

        let mut s = Session::new(Scripted::new(
            Ok("x".into()),
            Err(ClientError::Auth("refresh revoked".into())),
        ));
        s.sign_in().unwrap();
        assert_eq!(s.restore(), &SessionIdentity::default());
    }

    #[test]
    fn sign_out_resets_even_if_provider_fails() {
        let mut s = Session::new(Scripted::new(Ok("a@x.com".into()), Ok(None)));
        s.sign_in().unwrap();
        s.sign_out();

        assert!(s.provider.signed_out.get());
        assert_eq!(s.identity(), &SessionIdentity::default());
    }
}
