//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AnalysisConfig;
use super::validation::Validatable;
use crate::error::{ErrorContext, SbomAnalysisError};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbom-vulntree.yaml",
    ".sbom-vulntree.yml",
    "sbom-vulntree.yaml",
    "sbom-vulntree.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-vulntree/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("sbom-vulntree")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AnalysisConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load an `AnalysisConfig` from a YAML file and reject invalid values.
///
/// Every validation failure is reported, not just the first.
pub fn load_validated_config(path: &Path) -> crate::error::Result<AnalysisConfig> {
    let config = load_config_file(path)
        .with_context(|| format!("config file {}", path.display()))?;
    let errors = config.validate();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(SbomAnalysisError::invalid_config(&errors))
            .with_context(|| format!("config file {}", path.display()))
    }
}

/// Load config from discovered file, or return default.
///
/// A file that cannot be read, parsed or validated is logged and ignored.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AnalysisConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AnalysisConfig::default(), None),
        |path| match load_validated_config(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AnalysisConfig::default(), None)
            }
        },
    )
}

/// Render `config` as YAML, suitable for writing a config file.
pub fn to_yaml(config: &AnalysisConfig) -> Result<String, ConfigFileError> {
    Ok(serde_yaml::to_string(config)?)
}

// ============================================================================
// Example Configuration
// ============================================================================

/// Generate an example configuration file content.
#[must_use]
pub fn generate_example_config() -> String {
    r"# sbom-vulntree configuration
# Place this file at .sbom-vulntree.yaml in your project root or ~/.config/sbom-vulntree/

severity:
  # Band the first rating score (CVSS) when no rating has a severity label
  derive_from_score: false
  # Rating methods searched first, in order. Empty keeps document order.
  # Valid: CVSSv4, CVSSv31, CVSSv3, CVSSv2, OWASP, SSVC, other
  preferred_rating_methods: []

hierarchy:
  # Vulnerabilities and licenses shown per label before 'more' is signalled
  label_preview_limit: 10
  # Log dependency cycles at warn level
  warn_on_cycles: true
  # Materialize the vulnerable-only view
  include_vulnerable_view: true
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbom-vulntree.yaml");
        std::fs::write(&config_path, "hierarchy:\n  warn_on_cycles: false\n").unwrap();

        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r#"
severity:
  derive_from_score: true
  preferred_rating_methods: [CVSSv31, CVSSv3]
hierarchy:
  label_preview_limit: 4
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.severity.derive_from_score);
        assert_eq!(config.severity.preferred_rating_methods.len(), 2);
        assert_eq!(config.hierarchy.label_preview_limit, 4);
        assert!(config.hierarchy.include_vulnerable_view);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_load_config_file_invalid_yaml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("broken.yaml");
        std::fs::write(&config_path, "hierarchy: [unclosed\n").unwrap();

        let result = load_config_file(&config_path);
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_load_validated_config_reports_every_invalid_field() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("invalid.yaml");
        let yaml = "severity:\n  preferred_rating_methods: [CVSSv9]\nhierarchy:\n  label_preview_limit: 0\n";
        std::fs::write(&config_path, yaml).unwrap();

        // Loads fine, fails validation
        assert!(load_config_file(&config_path).is_ok());
        match load_validated_config(&config_path) {
            Err(SbomAnalysisError::Validation(msg)) => {
                assert!(msg.contains("invalid.yaml"), "{msg}");
                assert!(msg.contains("label_preview_limit"), "{msg}");
                assert!(msg.contains("CVSSv9"), "{msg}");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }

        let (config, loaded_from) = load_or_default(Some(&config_path));
        assert_eq!(config, AnalysisConfig::default());
        assert!(loaded_from.is_none());
    }

    #[test]
    fn test_load_validated_config_maps_load_failures() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.yaml");
        std::fs::write(&broken, "hierarchy: [unclosed\n").unwrap();

        match load_validated_config(&broken) {
            Err(SbomAnalysisError::Config(msg)) => {
                assert!(msg.contains("broken.yaml"), "{msg}");
                assert!(msg.contains("Failed to parse config file"), "{msg}");
            }
            other => panic!("Expected Config error, got {other:?}"),
        }
        assert!(matches!(
            load_validated_config(&tmp.path().join("absent.yaml")),
            Err(SbomAnalysisError::Config(_))
        ));

        let valid = tmp.path().join("valid.yaml");
        std::fs::write(&valid, "hierarchy:\n  label_preview_limit: 3\n").unwrap();
        let config = load_validated_config(&valid).unwrap();
        assert_eq!(config.hierarchy.label_preview_limit, 3);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("broken.yaml");
        std::fs::write(&config_path, "severity: 12\n").unwrap();

        let (config, loaded_from) = load_or_default(Some(&config_path));
        assert_eq!(config, AnalysisConfig::default());
        assert!(loaded_from.is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnalysisConfig::cvss_preset();
        let yaml = to_yaml(&config).unwrap();
        let parsed: AnalysisConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_example_config_parses() {
        let example = generate_example_config();
        let parsed: AnalysisConfig = serde_yaml::from_str(&example).unwrap();
        assert_eq!(parsed, AnalysisConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "hierarchy:\n  label_preview_limit: 3").unwrap();

        let discovered = discover_config_file(Some(&config_path));
        assert_eq!(discovered, Some(config_path));
    }
}
