use directories::ProjectDirs;
use pagemark_core::EditorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_SCHEMA_VERSION: u32 = 1;
const CONFIG_FILE_NAME: &str = "editor-config.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid value for environment variable {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u32,
    config: EditorConfig,
}

/// Hand-written config files may omit the envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Envelope(ConfigEnvelope),
    Bare(EditorConfig),
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "Pagemark", "Pagemark").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Load the saved editor configuration, or defaults when none was saved
    pub fn load_config(&self) -> Result<EditorConfig, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no saved editor config, using defaults");
            return Ok(EditorConfig::default());
        }

        load_config_file(&path)
    }

    pub fn save_config(&self, config: &EditorConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = ConfigEnvelope { version: CONFIG_SCHEMA_VERSION, config: config.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.config_path(), bytes)?;
        debug!(path = %self.config_path().display(), "editor config saved");
        Ok(())
    }
}

/// Read a config file at an explicit path, with or without the version envelope
pub fn load_config_file(path: &Path) -> Result<EditorConfig, StorageError> {
    let bytes = fs::read(path)?;
    let config = match serde_json::from_slice(&bytes)? {
        ConfigFile::Envelope(envelope) => {
            debug!(version = envelope.version, path = %path.display(), "editor config loaded");
            envelope.config
        }
        ConfigFile::Bare(config) => config,
    };
    Ok(config)
}

/// Apply `PAGEMARK_*` environment overrides on top of `config`.
///
/// Recognized variables:
/// - `PAGEMARK_MAX_DOCUMENTS`
/// - `PAGEMARK_MAX_ANNOTATIONS`
/// - `PAGEMARK_MIN_REGION_SIZE`
/// - `PAGEMARK_ZOOM`
pub fn apply_env_overrides(mut config: EditorConfig) -> Result<EditorConfig, StorageError> {
    if let Some(value) = env_value("PAGEMARK_MAX_DOCUMENTS")? {
        config.max_documents = value;
    }
    if let Some(value) = env_value("PAGEMARK_MAX_ANNOTATIONS")? {
        config.max_annotations = value;
    }
    if let Some(value) = env_value("PAGEMARK_MIN_REGION_SIZE")? {
        config.min_region_size = value;
    }
    if let Some(value) = env_value("PAGEMARK_ZOOM")? {
        config.zoom = value;
    }
    Ok(config)
}

fn env_value<T: std::str::FromStr>(key: &str) -> Result<Option<T>, StorageError> {
    match std::env::var(key) {
        Ok(raw) => {
            raw.trim().parse().map(Some).map_err(|_| StorageError::InvalidValue(key.to_string()))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::Size;
    use serial_test::serial;
    use std::env;

    const ENV_KEYS: [&str; 4] = [
        "PAGEMARK_MAX_DOCUMENTS",
        "PAGEMARK_MAX_ANNOTATIONS",
        "PAGEMARK_MIN_REGION_SIZE",
        "PAGEMARK_ZOOM",
    ];

    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let vars =
                var_names.iter().map(|name| (name.to_string(), env::var(name).ok())).collect();
            for name in var_names {
                env::remove_var(name);
            }
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn config_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let config = EditorConfig::new()
            .with_max_documents(4)
            .with_default_field_size(Size::new(180.0, 40.0))
            .with_zoom(1.25);

        store.save_config(&config).expect("save should succeed");
        let loaded = store.load_config().expect("load should succeed");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let loaded = store.load_config().expect("load should succeed");
        assert_eq!(loaded, EditorConfig::default());
    }

    #[test]
    fn saved_file_carries_schema_version() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path().join("nested"));

        store.save_config(&EditorConfig::default()).expect("save should succeed");

        let raw = fs::read_to_string(store.config_path()).expect("file written");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(json["version"], CONFIG_SCHEMA_VERSION);
        assert_eq!(json["config"]["max_documents"], 10);
    }

    #[test]
    fn bare_config_file_is_accepted() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("limits.json");
        fs::write(&path, r#"{"max_annotations": 3}"#).expect("write should succeed");

        let config = load_config_file(&path).expect("load should succeed");
        assert_eq!(config.max_annotations, 3);
        assert_eq!(config.max_documents, 10);
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(store.config_path(), "not json").expect("write should succeed");

        assert!(matches!(store.load_config(), Err(StorageError::Serde(_))));
    }

    #[test]
    #[serial]
    fn env_overrides_replace_loaded_values() {
        let _guard = EnvGuard::new(&ENV_KEYS);
        env::set_var("PAGEMARK_MAX_DOCUMENTS", "3");
        env::set_var("PAGEMARK_ZOOM", "2.0");

        let config = apply_env_overrides(EditorConfig::default()).expect("valid overrides");
        assert_eq!(config.max_documents, 3);
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.max_annotations, 500); // default
    }

    #[test]
    #[serial]
    fn invalid_env_value_names_the_variable() {
        let _guard = EnvGuard::new(&ENV_KEYS);
        env::set_var("PAGEMARK_MAX_ANNOTATIONS", "lots");

        match apply_env_overrides(EditorConfig::default()) {
            Err(StorageError::InvalidValue(key)) => assert_eq!(key, "PAGEMARK_MAX_ANNOTATIONS"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
