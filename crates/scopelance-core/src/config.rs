//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `makelance.toml` +
//! `makelance.<env>.toml` + `MAKELANCE_*` env vars. Command-line flags are
//! applied on top by the binary.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_DIRECTORY: &str = "~/latent-scope-data";
pub const DEFAULT_METRIC: &str = "cosine";
pub const DEFAULT_OUTPUT_DIR: &str = "scopes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root holding one sub-directory per dataset.
    pub directory: String,
    pub metric: String,
    /// Where the `<table_name>.json` sidecars go.
    pub output_dir: String,
    pub index: IndexSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub num_partitions: u32,
    /// Upper bound for the PQ sub-vector count; the lower bound is 1.
    pub max_sub_vectors: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory: DEFAULT_DIRECTORY.to_string(),
            metric: DEFAULT_METRIC.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            index: IndexSettings::default(),
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { num_partitions: 256, max_sub_vectors: 96 }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::extract(Self::figment_for_env(&env_name))
    }

    pub fn figment_for_env(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("makelance.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("makelance.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("makelance.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("makelance.test.toml")),
            _ => {}
        }
        figment.merge(Env::prefixed("MAKELANCE_").split("__"))
    }

    pub fn extract(figment: Figment) -> anyhow::Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.num_partitions == 0 {
            return Err(Error::InvalidConfig("index.num_partitions must be at least 1".to_string()));
        }
        if self.index.max_sub_vectors == 0 {
            return Err(Error::InvalidConfig("index.max_sub_vectors must be at least 1".to_string()));
        }
        if self.metric.trim().is_empty() {
            return Err(Error::InvalidConfig("metric must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        expand_path(&self.output_dir)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let s = Settings::extract(Figment::from(Serialized::defaults(Settings::default()))).expect("extract");
        assert_eq!(s.directory, "~/latent-scope-data");
        assert_eq!(s.metric, "cosine");
        assert_eq!(s.output_dir, "scopes");
        assert_eq!(s.index, IndexSettings { num_partitions: 256, max_sub_vectors: 96 });
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(
            "metric = \"l2\"\n[index]\nnum_partitions = 64\n",
        ));
        let s = Settings::extract(figment).expect("extract");
        assert_eq!(s.metric, "l2");
        assert_eq!(s.index.num_partitions, 64);
        assert_eq!(s.index.max_sub_vectors, 96);
    }

    #[test]
    fn zero_partitions_is_rejected() {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::string("[index]\nnum_partitions = 0\n"));
        let err = Settings::extract(figment).expect_err("invalid");
        assert!(err.to_string().contains("num_partitions"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let p = expand_path("~/latent-scope-data");
        assert!(!p.to_string_lossy().starts_with('~'));
        assert!(p.ends_with("latent-scope-data"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/work");
        assert_eq!(resolve_with_base(base, "/abs/scopes"), PathBuf::from("/abs/scopes"));
        assert_eq!(resolve_with_base(base, "scopes"), PathBuf::from("/work/scopes"));
    }
}
