//! Pipeline configuration loaded from TOML and overridden by CLI flags.
//!
//! ```toml
//! [input]
//! path = "data/2023 PRI OO UID - GENERAL.csv"
//! encoding = "ISO-8859-1"
//! chunk_size = 10000
//!
//! [output]
//! dir = "output"
//!
//! [processing]
//! join_policy = "lenient"
//! rules = "rules/oo-2023.toml"
//! ```
//!
//! Relative paths in a config file resolve against the file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pri_ingest::{DEFAULT_CHUNK_SIZE, LoadOptions};
use pri_transform::JoinPolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Encoding of the survey platform's export.
pub const DEFAULT_ENCODING: &str = "ISO-8859-1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub encoding: String,
    pub chunk_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            encoding: DEFAULT_ENCODING.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub signatory_file: String,
    pub questions_file: String,
    pub answers_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            signatory_file: "signatory.csv".to_string(),
            questions_file: "questions.csv".to_string(),
            answers_file: "answers.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    pub join_policy: JoinPolicy,
    /// Rules file; the embedded rule set is used when absent.
    pub rules: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            join_policy: JoinPolicy::default(),
            rules: None,
            show_progress: true,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub encoding: Option<String>,
    pub chunk_size: Option<usize>,
    pub rules: Option<PathBuf>,
    pub strict_joins: bool,
    pub no_progress: bool,
}

impl PipelineConfig {
    /// Read a config file and resolve its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("parse config file {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn resolve_relative(&mut self, base: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(path) = self.input.path.as_mut() {
            join(path);
        }
        join(&mut self.output.dir);
        if let Some(path) = self.processing.rules.as_mut() {
            join(path);
        }
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input) = overrides.input {
            self.input.path = Some(input);
        }
        if let Some(dir) = overrides.output_dir {
            self.output.dir = dir;
        }
        if let Some(encoding) = overrides.encoding {
            self.input.encoding = encoding;
        }
        if let Some(chunk_size) = overrides.chunk_size {
            self.input.chunk_size = chunk_size;
        }
        if let Some(rules) = overrides.rules {
            self.processing.rules = Some(rules);
        }
        if overrides.strict_joins {
            self.processing.join_policy = JoinPolicy::Strict;
        }
        if overrides.no_progress {
            self.processing.show_progress = false;
        }
        self
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_encoding(self.input.encoding.clone())
            .with_chunk_size(self.input.chunk_size.max(1))
            .with_progress(self.processing.show_progress)
    }
}
