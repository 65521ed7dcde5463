//! Configuration loading
//!
//! Settings are read in three layers, later ones winning: the embedded
//! `defaults/ftt.default.toml`, an optional `--config` file, then single command-line
//! choices such as `--format` and `--lenient`. [`Loader`] stacks them and deserializes
//! the result into [`FttConfig`].

use crate::ftt::diagnostics::DiagnosticCode;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_TOML: &str = include_str!("../../defaults/ftt.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FttConfig {
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

/// Knobs that change parse results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParserConfig {
    pub supported_version: FormatVersion,
    pub duplicate_ids: DuplicatePolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            supported_version: FormatVersion { major: 0, minor: 1 },
            duplicate_ids: DuplicatePolicy::Fatal,
        }
    }
}

/// A `MAJOR.MINOR` format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FromStr for FormatVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("expected MAJOR.MINOR, got '{s}'"))?;
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| format!("expected MAJOR.MINOR, got '{s}'"))
        };
        Ok(Self {
            major: parse(major)?,
            minor: parse(minor)?,
        })
    }
}

impl TryFrom<String> for FormatVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Handling of a second definition of an existing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    Fatal,
    Lenient,
}

impl DuplicatePolicy {
    /// The diagnostic raised for a duplicate id under this policy.
    pub fn diagnostic_code(self) -> DiagnosticCode {
        match self {
            DuplicatePolicy::Fatal => DiagnosticCode::DuplicateId,
            DuplicatePolicy::Lenient => DiagnosticCode::DuplicateIdIgnored,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::Fatal => "fatal",
            DuplicatePolicy::Lenient => "lenient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Why a configuration could not be assembled.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// A `--config` file that does not exist.
    MissingFile(PathBuf),
    /// A layer failed to read or the merged settings did not deserialize.
    Invalid {
        origin: String,
        source: ConfigError,
    },
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::MissingFile(path) => {
                write!(f, "config file '{}' does not exist", path.display())
            }
            ConfigLoadError::Invalid { origin, source } => write!(f, "{origin}: {source}"),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::MissingFile(_) => None,
            ConfigLoadError::Invalid { source, .. } => Some(source),
        }
    }
}

/// Layers a user file and command-line choices over the embedded defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
    /// Where the settings come from, for error messages.
    origin: String,
}

impl Loader {
    pub fn embedded() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
            origin: "built-in defaults".to_string(),
        }
    }

    /// Layer the TOML file given with `--config`.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigLoadError::MissingFile(path.to_path_buf()));
        }
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml));
        self.origin = format!("config file '{}'", path.display());
        Ok(self)
    }

    pub fn with_output_format(self, format: &str) -> Result<Self, ConfigLoadError> {
        self.set("output.format", format)
    }

    pub fn with_duplicate_policy(self, policy: DuplicatePolicy) -> Result<Self, ConfigLoadError> {
        self.set("parser.duplicate_ids", policy.as_str())
    }

    pub fn with_supported_version(self, version: &str) -> Result<Self, ConfigLoadError> {
        self.set("parser.supported_version", version)
    }

    fn set(mut self, key: &str, value: &str) -> Result<Self, ConfigLoadError> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|source| ConfigLoadError::Invalid {
                origin: format!("override '{key}'"),
                source,
            })?;
        Ok(self)
    }

    pub fn build(self) -> Result<FttConfig, ConfigLoadError> {
        let origin = self.origin;
        self.builder
            .build()
            .and_then(Config::try_deserialize::<FttConfig>)
            .map_err(|source| ConfigLoadError::Invalid { origin, source })
    }
}

impl FttConfig {
    /// The configuration shipped in `defaults/ftt.default.toml`.
    pub fn embedded() -> Result<Self, ConfigLoadError> {
        Loader::embedded().build()
    }
}
