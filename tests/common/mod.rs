/*!
 * Common test utilities for the translate-relay test suite
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use translate_relay::EndpointConfiguration;
use translate_relay::LanguageList;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates one model directory per pair under `root`
pub fn create_model_dirs(root: &Path, pairs: &[(&str, &str)]) -> Result<()> {
    for (from, to) in pairs {
        fs::create_dir_all(root.join(format!("{}_{}", from, to)))?;
    }
    Ok(())
}

/// Owned copies of the given texts
pub fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Language list offering the same codes as sources and targets
pub fn language_list(codes: &[&str]) -> LanguageList {
    LanguageList::symmetric(codes.iter().map(|c| (*c, c.to_uppercase())))
}

/// Two endpoints sharing en/es, with it only on the first and de only on the second
pub fn two_endpoint_configuration(weights: [f64; 2]) -> EndpointConfiguration {
    EndpointConfiguration::new(
        vec!["endpoint1.com".to_string(), "endpoint2.com".to_string()],
        weights.to_vec(),
        &[
            language_list(&["en", "es", "it"]),
            language_list(&["en", "es", "de"]),
        ],
    )
    .expect("valid endpoint configuration")
}
