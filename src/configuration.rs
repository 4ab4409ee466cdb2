//! src/configuration.rs
use crate::top::DEFAULT_TOP_N;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub benchmark: BenchmarkSettings,
    pub engine: EngineSettings,
    pub fanout: FanOutSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct BenchmarkSettings {
    pub files: Vec<PathBuf>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_n: usize,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EngineSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: NonZeroUsize,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FanOutSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub report_timeout_secs: u64,
}

impl FanOutSettings {
    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read current dir: {e}")))?;
    get_configuration_from(base_path.join("configuration"))
}

/// Layers `base.yaml` from `config_dir` (optional) and `WORDBENCH_*`
/// environment variables over built-in defaults.
pub fn get_configuration_from(config_dir: PathBuf) -> Result<Settings, config::ConfigError> {
    load(config_dir, None)
}

fn load(
    config_dir: PathBuf,
    env: Option<HashMap<String, String>>,
) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("benchmark.files", Vec::<String>::new())?
        .set_default("benchmark.top_n", DEFAULT_TOP_N as u64)?
        .set_default("engine.workers", 4u64)?
        .set_default("fanout.report_timeout_secs", 120u64)?
        .add_source(config::File::from(config_dir.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("WORDBENCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("benchmark.files")
                .source(env),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::{get_configuration, load};
    use claims::{assert_err, assert_ok};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn should_get_base_dot_yaml() {
        let settings = get_configuration().expect("Failed to get configuration");

        assert_eq!(settings.engine.workers.get(), 4);
        assert_eq!(settings.benchmark.top_n, 10);
        assert_eq!(settings.benchmark.files.len(), 7);
        assert_eq!(settings.fanout.report_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn should_take_the_file_list_from_the_environment() {
        let env = HashMap::from([
            ("WORDBENCH_BENCHMARK__FILES".to_string(), "a.txt,b.txt".to_string()),
            ("WORDBENCH_ENGINE__WORKERS".to_string(), "8".to_string()),
        ]);
        let settings = assert_ok!(load(PathBuf::from("configuration"), Some(env)));

        assert_eq!(
            settings.benchmark.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(settings.engine.workers.get(), 8);
        assert_eq!(settings.benchmark.top_n, 10);
    }

    #[test]
    fn should_fall_back_to_defaults_without_a_config_dir() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = assert_ok!(load(dir.path().join("nope"), Some(HashMap::new())));

        assert!(settings.benchmark.files.is_empty());
        assert_eq!(settings.benchmark.top_n, 10);
        assert_eq!(settings.engine.workers.get(), 4);
        assert_eq!(settings.fanout.report_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn should_reject_a_zero_worker_count() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join("base.yaml"),
            "benchmark:\n  files: []\n  top_n: 3\nengine:\n  workers: 0\nfanout:\n  report_timeout_secs: 1\n",
        )
        .expect("Failed to write config");
        assert_err!(load(dir.path().to_path_buf(), Some(HashMap::new())));
    }
}
