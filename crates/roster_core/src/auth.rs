//! Login gate in front of the roster.
//!
//! # Responsibility
//! - Check a username/password pair through a replaceable checker.
//! - Hand a ready roster controller to the caller after a successful login.
//!
//! # Invariants
//! - Credentials are never logged.
//! - The store is only opened after the credentials are accepted.

use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::service::roster_controller::RosterController;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";

/// Decides whether a username/password pair may enter.
pub trait CredentialChecker {
    fn check(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialChecker for F
where
    F: Fn(&str, &str) -> bool,
{
    fn check(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// One fixed username/password pair, compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl CredentialChecker for FixedCredentials {
    fn check(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Login failures.
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    /// Credentials were accepted but the roster store could not be opened.
    Store(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::Store(err) => write!(f, "failed to open roster store: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCredentials => None,
            Self::Store(err) => Some(err),
        }
    }
}

/// Login step guarding access to the roster controller.
pub struct AccessGate<C: CredentialChecker> {
    checker: C,
}

impl AccessGate<FixedCredentials> {
    /// Gate accepting the built-in administrator account.
    pub fn with_default_credentials() -> Self {
        Self::new(FixedCredentials::default())
    }
}

impl<C: CredentialChecker> AccessGate<C> {
    pub fn new(checker: C) -> Self {
        Self { checker }
    }

    /// Returns whether the pair is accepted.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let accepted = self.checker.check(username, password);
        if accepted {
            info!("event=login module=auth status=ok");
        } else {
            warn!("event=login module=auth status=denied");
        }
        accepted
    }

    /// Authenticates, then opens the store and returns a loaded controller.
    ///
    /// `open_repo` is only called after the credentials are accepted.
    pub fn unlock<R, F>(
        &self,
        username: &str,
        password: &str,
        open_repo: F,
    ) -> Result<RosterController<R>, AuthError>
    where
        R: StudentRepository,
        F: FnOnce() -> Result<R, RepoError>,
    {
        if !self.authenticate(username, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let repo = open_repo().map_err(AuthError::Store)?;
        Ok(RosterController::open(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialChecker, FixedCredentials};

    #[test]
    fn default_credentials_match_admin_account_only() {
        let credentials = FixedCredentials::default();
        assert!(credentials.check("admin", "admin123"));
        assert!(!credentials.check("admin", "ADMIN123"));
        assert!(!credentials.check(" admin", "admin123"));
        assert!(!credentials.check("", ""));
    }

    #[test]
    fn closures_act_as_checkers() {
        let checker = |user: &str, _: &str| user == "ops";
        assert!(checker.check("ops", "anything"));
        assert!(!checker.check("admin", "admin123"));
    }
}
