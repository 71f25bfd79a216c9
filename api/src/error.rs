use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

#[derive(Debug)]
pub enum Error {
    ApiError {
        status: u16,
        description: Option<String>,
        json: Option<Value>,
    },
    Authentication,
    Generic(String),
    Mapping(String),
    Request,
    Storage(String),
    UnexpectedPayload,
    UnhandledStatus(u16),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiError { status, description, json: _ } => match description {
                Some(string) => write!(f, "{string}"),
                None => write!(f, "Unexpected response status {status}"),
            },
            Self::Authentication => write!(f, "Login failed"),
            Self::Generic(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "Malformed record: {err}"),
            Self::Request => write!(f, "request failed"),
            Self::Storage(err) => write!(f, "Cookie storage failed: {err}"),
            Self::UnexpectedPayload => write!(f, "Unexpected response payload"),
            Self::UnhandledStatus(status) => write!(f, "Unexpected response status {status}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Converts error responses of the service into Rust errors
    pub(crate) async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let is_json = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .is_some_and(|val| val.contains("application/json"));
        if !is_json {
            return Error::UnhandledStatus(status);
        }
        match res.json::<Value>().await {
            Ok(data) => Error::ApiError { status, description: describe(&data), json: Some(data) },
            Err(_) => Error::UnhandledStatus(status),
        }
    }
}

fn describe(data: &Value) -> Option<String> {
    match data {
        Value::Array(list) => list.first().and_then(Value::as_str).map(ToOwned::to_owned),
        Value::Object(obj) => ["detail", "message"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(ToOwned::to_owned),
        _ => None,
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Generic(format!("{value}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Generic(format!("{value}"))
    }
}

impl From<time::error::Format> for Error {
    fn from(value: time::error::Format) -> Self {
        Error::Generic(format!("{value}"))
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Error::Generic(format!("{value}"))
    }
}
