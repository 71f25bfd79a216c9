use std::path::Path;

use serde_json::Value;
use url::Url;

use crate::session::{Credentials, Session};
use crate::{Error, Result};

/// Entry point for the HotSchedules API.
///
/// Each client owns its session and cookie store; nothing is shared between
/// instances. Dropping the client closes its connections.
pub struct Client {
    session: Session,
}

/// Getters & instantiation
impl Client {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self { session: Session::new(None, credentials)? })
    }

    /// Used for testing mainly
    pub fn with_root(mut self, root: Url) -> Self {
        self.session.set_root(root);
        self
    }

    pub fn username(&self) -> &str {
        self.session.credentials().username()
    }

    pub fn load_cookies<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.session.load_cookies(path)
    }

    pub fn save_cookies<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.session.save_cookies(path)
    }

    pub async fn login(&self) -> Result<()> {
        self.session.login().await
    }
}

/// Methods for internal use
impl Client {
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }
}

/// Maps every element of a JSON array, failing the whole list on the first bad element
pub(crate) fn map_list<T, F>(payload: Value, f: F) -> Result<Vec<T>>
where
    F: Fn(Value) -> Result<T>,
{
    match payload {
        Value::Array(items) => items.into_iter().map(f).collect(),
        _ => Err(Error::UnexpectedPayload),
    }
}

#[cfg(test)]
/// Helper function for DRY tests
pub fn test_client(server: &utilities::mocking::FakeHotSchedules) -> Client {
    let credentials = Credentials::new(utilities::mocking::USERNAME, utilities::mocking::PASSWORD);
    Client::new(credentials)
        .unwrap()
        .with_root(Url::parse(&server.root()).unwrap())
}
