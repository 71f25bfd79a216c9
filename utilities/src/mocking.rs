pub use mockito::{Matcher, Mock};
use serde_json::Value;

pub const USERNAME: &str = "jane";
pub const PASSWORD: &str = "correct horse";
pub const SESSION_COOKIE: &str = "hs_user=session-token; Path=/";

pub struct FakeHotSchedules {
    server: mockito::ServerGuard,
}

impl FakeHotSchedules {
    pub async fn new() -> Self {
        Self { server: mockito::Server::new_async().await }
    }

    pub fn mock<P: Into<Matcher>>(&mut self, method: &str, path: P) -> Mock {
        self.server.mock(method, path)
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Root the api client joins its endpoint paths onto
    pub fn root(&self) -> String {
        format!("{}/hs/", self.server.url())
    }

    fn default_mock<P: Into<Matcher>>(&mut self, method: &str, path: P) -> Mock {
        self.server
            .mock(method, path)
            .with_status(200)
            .with_header("content-type", "application/json")
    }

    pub fn json_mock<P: Into<Matcher>>(&mut self, method: &str, path: P, body: Value) -> Mock {
        self.default_mock(method, path).with_body(body.to_string())
    }

    pub fn with_fixture<P: Into<Matcher>>(&mut self, method: &str, path: P, fixture: &str) -> Mock {
        let file = format!("{}/fixtures/{fixture}.json", env!("CARGO_MANIFEST_DIR"));
        self.default_mock(method, path).with_body_from_file(file)
    }

    /// Login accepting the test credentials and handing out the identity cookie
    pub async fn mock_login(&mut self, hits: usize) -> Mock {
        self.server
            .mock("POST", "/hs/prelogin.hs")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), USERNAME.into()),
                Matcher::UrlEncoded("password".into(), PASSWORD.into()),
            ]))
            .with_status(200)
            .with_header("set-cookie", SESSION_COOKIE)
            .expect(hits)
            .create_async()
            .await
    }

    /// Login that answers without the identity cookie
    pub async fn mock_rejected_login(&mut self) -> Mock {
        self.server
            .mock("POST", "/hs/prelogin.hs")
            .with_status(200)
            .with_header("set-cookie", "JSESSIONID=anonymous; Path=/")
            .expect(1)
            .create_async()
            .await
    }

    /// The service signals a dropped session with a redirect to its login page
    pub fn mock_expired<P: Into<Matcher>>(&mut self, path: P) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(302)
            .with_header("location", "/hs/login.hs")
    }

    pub async fn mock_employees(&mut self, fixture: &str, hits: usize) -> Mock {
        self.with_fixture("GET", "/hs/spring/client/employee/", fixture)
            .match_query(Matcher::UrlEncoded("active".into(), "true".into()))
            .expect(hits)
            .create_async()
            .await
    }

    pub async fn mock_shifts(&mut self, start: &str, end: &str, fixture: &str) -> Mock {
        self.with_fixture("GET", "/hs/spring/shifts/posted/", fixture)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), start.into()),
                Matcher::UrlEncoded("end".into(), end.into()),
            ]))
            .expect(1)
            .create_async()
            .await
    }
}
