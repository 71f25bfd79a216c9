use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::commands::{Error, Result};

const APP_NAME: &str = "hotschedules-cli";
const COOKIE_FILE: &str = "cookies.json";

fn load<T: Serialize + DeserializeOwned + Default>(name: &str) -> Result<T> {
    confy::load(APP_NAME, name).map_err(|e| Error::Config(format!("Could not read {name}: {e}")))
}

fn store<T: Serialize>(name: &str, cfg: T) -> Result<()> {
    confy::store(APP_NAME, name, cfg).map_err(|e| Error::Config(format!("Could not write {name}: {e}")))
}

/// Same directory confy keeps its configuration in
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("rs", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn cookie_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(COOKIE_FILE))
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Settings {
    pub username: Option<String>,
}

impl Settings {
    const CONFIG_NAME: &'static str = "config";

    pub fn load() -> Result<Self> {
        load::<Self>(Self::CONFIG_NAME)
    }

    pub fn store(&self) -> Result<()> {
        store(Self::CONFIG_NAME, self)
    }
}
