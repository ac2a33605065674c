//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["quorum-extract.toml", ".quorum-extract.toml"];

/// Prefix of environment overrides (`QUORUM_EXTRACT_EXTRACTION__TIMEOUT_SECONDS=30`)
const ENV_PREFIX: &str = "QUORUM_EXTRACT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `QUORUM_EXTRACT_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./quorum-extract.toml` or `./.quorum-extract.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/quorum-extract/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::global_config_path(), Path::new("."))
            .merge(Self::env())
            .extract()
            .map_err(Box::new)
    }

    /// File and default sources, without the environment layer
    fn figment(
        config_path: Option<&PathBuf>,
        global_path: Option<PathBuf>,
        project_dir: &Path,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/quorum-extract/config.toml if set,
    /// otherwise falls back to ~/.config/quorum-extract/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quorum-extract").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./quorum-extract.toml or ./.quorum-extract.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract_domain::OutputFormat;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.extraction.timeout_seconds, None);
        assert_eq!(config.providers.len(), 3);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("quorum-extract"));
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("quorum-extract.toml"),
            "[extraction]\ntimeout_seconds = 30\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[extraction]\ntimeout_seconds = 90\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&explicit), None, dir.path())
            .extract()
            .unwrap();

        assert_eq!(config.extraction.timeout_seconds, Some(90));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_provider_section_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".quorum-extract.toml"),
            "[providers.claude]\nmodel = \"claude-opus-4-1\"\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, None, dir.path())
            .extract()
            .unwrap();

        let claude = &config.providers["claude"];
        assert_eq!(claude.model, "claude-opus-4-1");
        assert_eq!(claude.api_key_env, "ANTHROPIC_API_KEY");
        assert!(config.providers.contains_key("gemini"));
    }

    #[test]
    fn test_global_file_is_lowest_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(&global, "[output]\ncolor = false\n\n[extraction]\ntimeout_seconds = 10\n")
            .unwrap();
        fs::write(
            dir.path().join("quorum-extract.toml"),
            "[extraction]\ntimeout_seconds = 20\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, Some(global), dir.path())
            .extract()
            .unwrap();

        assert!(!config.output.color);
        assert_eq!(config.extraction.timeout_seconds, Some(20));
    }

    #[test]
    fn test_env_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("quorum-extract.toml", "[extraction]\ntimeout_seconds = 20\n")?;
            jail.set_env("QUORUM_EXTRACT_EXTRACTION__TIMEOUT_SECONDS", "45");

            let config: FileConfig = ConfigLoader::figment(None, None, jail.directory())
                .merge(ConfigLoader::env())
                .extract()?;
            assert_eq!(config.extraction.timeout_seconds, Some(45));
            Ok(())
        });
    }
}
