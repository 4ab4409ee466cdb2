//! tests/api/helpers.rs
use std::path::PathBuf;
use std::sync::LazyLock;
use wordbench::telemetry::init_tracing;

static TRACING: LazyLock<()> = LazyLock::new(|| {
    init_tracing().expect("Failed to setup tracing");
});

pub fn setup() {
    LazyLock::force(&TRACING);
}

pub fn test_data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path
}

pub fn test_files(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|name| test_data_dir().join(name)).collect()
}
