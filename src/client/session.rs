use std::cell::RefCell;

use actix_identity::Identity;

/// Per-user credential source used by [`super::SecurityMode::ClientSession`].
pub trait ClientSession {
    /// Bearer token of the signed-in user, if any.
    fn token(&self) -> Option<String>;
    /// Ends the session after the backend rejected its token.
    fn sign_out(&self);
}

/// [`ClientSession`] backed by the `actix-identity` login, whose id is the
/// application-issued token.
pub struct IdentitySession {
    identity: RefCell<Option<Identity>>,
    token: Option<String>,
}

impl IdentitySession {
    pub fn new(identity: Identity) -> Self {
        let token = identity.id().ok();
        Self {
            identity: RefCell::new(Some(identity)),
            token,
        }
    }

    /// True once [`ClientSession::sign_out`] has run.
    pub fn is_signed_out(&self) -> bool {
        self.identity.borrow().is_none()
    }
}

impl ClientSession for IdentitySession {
    fn token(&self) -> Option<String> {
        if self.is_signed_out() {
            return None;
        }
        self.token.clone()
    }

    fn sign_out(&self) {
        if let Some(identity) = self.identity.borrow_mut().take() {
            identity.logout();
        }
    }
}
