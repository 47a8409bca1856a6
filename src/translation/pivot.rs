/*!
 * Pivot routing for on-box translation engines.
 *
 * A local engine holds one model per language pair. When no model exists for
 * the requested pair, the text is translated into English first and from English
 * into the target language, provided both models are installed.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::errors::TranslationError;
use crate::providers::TranslationEngine;

/// The only intermediate language used for two-hop translation
pub const PIVOT_LANGUAGE: &str = "en";

/// Model directory names: `<from>_<to>`, each an optional script/region subtag
static MODEL_DIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{2,3}(?:-[A-Za-z]{2,4})?)_([A-Za-z]{2,3}(?:-[A-Za-z]{2,4})?)$")
        .expect("Invalid model directory regex")
});

/// Answers whether a translation model exists for a language pair
pub trait ModelRegistry: Send + Sync + fmt::Debug {
    /// Check if a model for `from -> to` is installed
    fn has_model(&self, from: &str, to: &str) -> bool;
}

/// Model registry backed by a directory holding one sub-directory per pair
///
/// A model for `de -> en` lives in `<root>/de_en/`.
#[derive(Debug, Clone)]
pub struct FsModelRegistry {
    root: PathBuf,
}

impl FsModelRegistry {
    /// Create a registry reading models from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the registry reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory expected to hold the model for `from -> to`
    pub fn model_dir(&self, from: &str, to: &str) -> PathBuf {
        self.root.join(format!("{}_{}", from, to))
    }

    /// All installed pairs, sorted
    pub fn available_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                MODEL_DIR_REGEX
                    .captures(&name)
                    .map(|cap| (cap[1].to_string(), cap[2].to_string()))
            })
            .collect();
        pairs.sort();
        pairs
    }
}

impl ModelRegistry for FsModelRegistry {
    fn has_model(&self, from: &str, to: &str) -> bool {
        self.model_dir(from, to).is_dir()
    }
}

/// How a language pair can be served by the installed models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PivotPath {
    /// A model exists for the exact pair
    Direct { from: String, to: String },
    /// Models exist for `from -> via` and `via -> to`
    Pivot { from: String, via: String, to: String },
    /// No usable model combination
    Unavailable,
}

impl fmt::Display for PivotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct { from, to } => write!(f, "{} -> {}", from, to),
            Self::Pivot { from, via, to } => write!(f, "{} -> {} -> {}", from, via, to),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Routes translations to the local engine, pivoting through English when needed
#[derive(Debug, Clone)]
pub struct PivotTranslationRouter {
    registry: Arc<dyn ModelRegistry>,
    engine: Arc<dyn TranslationEngine>,
}

impl PivotTranslationRouter {
    /// Create a router over the given model registry and engine
    pub fn new(registry: Arc<dyn ModelRegistry>, engine: Arc<dyn TranslationEngine>) -> Self {
        Self { registry, engine }
    }

    /// Work out which models serve `from -> to`
    ///
    /// English is never used as an intermediate when it is already the target.
    pub fn resolve(&self, from: &str, to: &str) -> PivotPath {
        if self.registry.has_model(from, to) {
            return PivotPath::Direct {
                from: from.to_string(),
                to: to.to_string(),
            };
        }

        if to == PIVOT_LANGUAGE {
            return PivotPath::Unavailable;
        }

        if self.registry.has_model(from, PIVOT_LANGUAGE) && self.registry.has_model(PIVOT_LANGUAGE, to) {
            return PivotPath::Pivot {
                from: from.to_string(),
                via: PIVOT_LANGUAGE.to_string(),
                to: to.to_string(),
            };
        }

        PivotPath::Unavailable
    }

    /// Translate `texts` from `from` to `to`
    ///
    /// # Returns
    /// * `Result<Vec<String>, TranslationError>` - Translations in input order, or
    ///   `ModelUnavailable` when no route exists. A failing first hop aborts the
    ///   call before the second hop is attempted.
    pub async fn translate(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, TranslationError> {
        match self.resolve(from, to) {
            PivotPath::Direct { from, to } => self.translate_hop(texts, &from, &to).await,
            PivotPath::Pivot { from, via, to } => {
                debug!("No {} -> {} model, pivoting through {}", from, to, via);
                let intermediate = self.translate_hop(texts, &from, &via).await?;
                self.translate_hop(&intermediate, &via, &to).await
            }
            PivotPath::Unavailable => {
                warn!("No translation model available for {} -> {}", from, to);
                Err(TranslationError::ModelUnavailable {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    /// Run one engine call and check it kept one output per input
    async fn translate_hop(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, TranslationError> {
        debug!("Translating {} text(s) {} -> {}", texts.len(), from, to);
        let translated = self.engine.translate_batch(texts, from, to).await?;

        if translated.len() != texts.len() {
            return Err(TranslationError::LengthMismatch {
                expected: texts.len(),
                actual: translated.len(),
            });
        }

        Ok(translated)
    }
}
