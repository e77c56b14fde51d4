use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Chainable, Result};

/// Name of the optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "zite.toml";

/// Where to read sources from and where to write the site to.
///
/// Both paths are used as given: relative paths resolve against the process'
/// working directory, not against the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "Config::default_src", alias = "Src")]
    pub src: PathBuf,
    #[serde(default = "Config::default_out", alias = "Out")]
    pub out: PathBuf,
}

impl Config {
    pub fn new<S: Into<PathBuf>, O: Into<PathBuf>>(src: S, out: O) -> Self {
        Config { src: src.into(), out: out.into() }
    }

    fn default_src() -> PathBuf {
        "src".into()
    }

    fn default_out() -> PathBuf {
        "www".into()
    }

    /// Reads `dir/zite.toml`. A missing file yields [`Config::default()`].
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Config::default());
        }

        Self::read(&path)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read config file",
            "path" => path.display(),
        })?;

        toml::from_str(&string).chain_with(|| error! {
            "could not parse config file",
            "path" => path.display(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config { src: Config::default_src(), out: Config::default_out() }
    }
}
