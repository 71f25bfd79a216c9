use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    sync::{Arc, MutexGuard},
};

use cookie_store::CookieStore;
use log::{debug, info, warn};
pub use reqwest::Method;
pub use reqwest::StatusCode;
use reqwest::redirect;
use reqwest_cookie_store::CookieStoreMutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{Error, Result};

/// Cookie whose presence marks a (possibly stale) authenticated session
pub const IDENTITY_COOKIE: &str = "hs_user";

const LOGIN_PATH: &str = "prelogin.hs";

#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One logical call, kept around so it can be re-issued after a re-login
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    params: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, params: Vec::new() }
    }

    pub fn param<K: AsRef<str>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.as_ref().to_owned(), value.to_string()));
        self
    }
}

/// Wraps the 3rd party http client Response
pub struct Response {
    response: reqwest::Response,
}

impl Response {
    pub fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// The service answers with a redirect to its login page once the session is gone
    pub fn is_expired(&self) -> bool {
        self.status() == StatusCode::FOUND
    }

    pub async fn into_error(self) -> Error {
        Error::from_response(self.response).await
    }

    pub async fn parse_json<J>(self) -> Result<J>
    where
        J: DeserializeOwned,
    {
        if self.status().is_success() {
            Ok(self.response.json::<J>().await?)
        } else {
            Err(self.into_error().await)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }
}

/// Credentials plus the cookie jar they unlock.
///
/// The http client and its cookie store live exactly as long as the session and
/// are released when it is dropped. Calls are expected to run one at a time: a
/// login clears the store, which would race with a concurrent call's check.
pub struct Session {
    credentials: Credentials,
    cookies: Arc<CookieStoreMutex>,
    http: reqwest::Client,
    root: Url,
}

impl Session {
    pub fn new(root: Option<Url>, credentials: Credentials) -> Result<Self> {
        let cookies = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .redirect(redirect::Policy::none())
            .build()?;
        let root = root.unwrap_or_else(super::default_root);
        Ok(Self { credentials, cookies, http, root })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn set_root(&mut self, root: Url) {
        self.root = root;
    }

    pub fn get(&self, path: &str) -> Result<Request> {
        Ok(Request::new(Method::GET, self.root.join(path)?))
    }

    /// Replaces the cookie store with the cookies persisted at `path`
    pub fn load_cookies<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| storage_error(path, e))?;
        let loaded = cookie_store::serde::json::load_all(BufReader::new(file)).map_err(|e| storage_error(path, e))?;
        *self.store()? = loaded;
        info!("Loaded cookies from {}", path.display());
        Ok(())
    }

    /// Persists every cookie, session cookies included, to `path`
    pub fn save_cookies<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| storage_error(path, e))?;
        let mut writer = BufWriter::new(file);
        {
            let store = self.store()?;
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut writer)
                .map_err(|e| storage_error(path, e))?;
        }
        writer.flush().map_err(|e| storage_error(path, e))?;
        info!("Saved cookies to {}", path.display());
        Ok(())
    }

    pub fn has_cookie(&self, url: &Url, name: &str) -> Result<bool> {
        let store = self.store()?;
        Ok(store.matches(url).iter().any(|cookie| cookie.name() == name))
    }

    pub fn clear_cookies(&self) -> Result<()> {
        self.store()?.clear();
        Ok(())
    }

    /// Starts a fresh session, failing when the service hands out no identity cookie
    pub async fn login(&self) -> Result<()> {
        self.clear_cookies()?;
        let url = self.root.join(LOGIN_PATH)?;
        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];
        debug!("Logging in as {}", self.credentials.username);
        let res = self.http.post(url.clone()).form(&form).send().await?;
        debug!("Login answered with status {}", res.status());

        if self.has_cookie(&url, IDENTITY_COOKIE)? {
            info!("Logged in as {}", self.credentials.username);
            Ok(())
        } else {
            Err(Error::Authentication)
        }
    }

    /// Sends `request` under a valid session and decodes the JSON body.
    ///
    /// A missing identity cookie triggers a login up front. A redirect answer means
    /// the server dropped the session, which earns exactly one more login and one
    /// more attempt before giving up with [`Error::Request`].
    pub async fn send(&self, request: &Request) -> Result<Value> {
        if !self.has_cookie(&request.url, IDENTITY_COOKIE)? {
            debug!("No {IDENTITY_COOKIE} cookie for {}", request.url);
            self.login().await?;
        }

        let res = self.dispatch(request).await?;
        if !res.is_expired() {
            return res.parse_json().await;
        }

        warn!("Session expired while requesting {}, logging in again", request.url);
        self.login().await?;
        let res = self.dispatch(request).await?;
        if res.is_expired() {
            return Err(Error::Request);
        }
        res.parse_json().await
    }

    async fn dispatch(&self, request: &Request) -> Result<Response> {
        debug!("{} {}", request.method, request.url);
        let res = self
            .http
            .request(request.method.clone(), request.url.clone())
            .query(&request.params)
            .send()
            .await?;
        debug!("{} {} answered with status {}", request.method, request.url, res.status());
        Ok(Response::new(res))
    }

    fn store(&self) -> Result<MutexGuard<'_, CookieStore>> {
        self.cookies
            .lock()
            .map_err(|_| Error::Storage("cookie store lock poisoned".into()))
    }

    #[cfg(test)]
    pub(crate) fn insert_cookie(&self, cookie: &str, url: &Url) {
        self.store().unwrap().parse(cookie, url).unwrap();
    }
}

fn storage_error<E: std::fmt::Display>(path: &Path, err: E) -> Error {
    Error::Storage(format!("{}: {err}", path.display()))
}

#[cfg(test)]
/// Helper function for DRY tests
pub fn test_session(server: &utilities::mocking::FakeHotSchedules) -> Session {
    let root = Url::parse(&server.root()).unwrap();
    Session::new(Some(root), Credentials::new(utilities::mocking::USERNAME, utilities::mocking::PASSWORD)).unwrap()
}
