pub mod client;
pub mod employees;
mod error;
pub mod session;
pub mod shifts;

pub use client::Client;
pub use employees::{Employee, EmployeeId};
pub use error::Error;
pub use session::Credentials;
pub use shifts::Shift;

const DEFAULT_HOST: &str = "https://app.hotschedules.com";
const API_ROOT: &str = "/hs/";

pub type Result<T> = std::result::Result<T, Error>;

fn default_root() -> url::Url {
    url::Url::parse(DEFAULT_HOST)
        .and_then(|host| host.join(API_ROOT))
        .expect("default root is a valid url")
}
