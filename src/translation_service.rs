/*!
 * Request-level translation orchestration.
 *
 * `TranslationService` receives one translate request (source language, target
 * language, texts), groups the texts by source language, sends each group to the
 * configured backend and returns the translations in input order. Markup in each
 * text is protected around the backend call.
 */

use log::{debug, info};
use std::sync::Arc;

use crate::endpoint_selector::EndpointConfiguration;
use crate::errors::TranslationError;
use crate::language_utils::{self, AUTO_DETECT, LanguageList};
use crate::providers::{EndpointClient, LanguageDetector};
use crate::translation::{PivotTranslationRouter, ProtectedText, TagProtector};

/// Where translations are sent
#[derive(Debug, Clone)]
pub enum Backend {
    /// Remote vendor endpoints, one chosen per group by weight
    Endpoints {
        /// Endpoints, weights and supported languages
        configuration: Arc<EndpointConfiguration>,
        /// Transport to the chosen endpoint
        client: Arc<dyn EndpointClient>,
    },

    /// A single on-box engine with per-pair models
    Local(PivotTranslationRouter),
}

/// Options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Whether to protect markup spans around the backend call
    pub protect_tags: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self { protect_tags: true }
    }
}

/// Texts of one request that share a source language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    /// Declared or detected source language
    pub language: String,
    /// Positions of the group's texts in the request
    pub indices: Vec<usize>,
}

/// Translation service wiring the selector, tag protection and pivot routing together
#[derive(Debug, Clone)]
pub struct TranslationService {
    backend: Backend,
    detector: Option<Arc<dyn LanguageDetector>>,
    options: TranslationOptions,
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(backend: Backend, options: TranslationOptions) -> Self {
        match &backend {
            Backend::Endpoints { configuration, .. } => info!(
                "Translation service using {} endpoint(s)",
                configuration.endpoints().len()
            ),
            Backend::Local(_) => info!("Translation service using the local engine"),
        }

        Self {
            backend,
            detector: None,
            options,
        }
    }

    /// Detect the language of `auto` texts with `detector` before routing them
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Language catalog served by the backend, when it advertises one
    pub fn languages(&self) -> Option<&LanguageList> {
        match &self.backend {
            Backend::Endpoints { configuration, .. } => Some(configuration.languages()),
            Backend::Local(_) => None,
        }
    }

    /// Group texts by source language, in order of first appearance
    ///
    /// A declared language applies to every text. For `auto`, each text goes to
    /// the group of its detected language; texts the detector cannot place (or
    /// every text, when there is no detector) stay under `auto`.
    pub fn group_by_source(&self, from: &str, texts: &[String]) -> Vec<SourceGroup> {
        let detector = match (&self.detector, from == AUTO_DETECT) {
            (Some(detector), true) => detector,
            _ => {
                return vec![SourceGroup {
                    language: from.to_string(),
                    indices: (0..texts.len()).collect(),
                }];
            }
        };

        let mut groups: Vec<SourceGroup> = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let language = detector
                .detect(text)
                .unwrap_or_else(|| AUTO_DETECT.to_string());

            match groups.iter_mut().find(|g| g.language == language) {
                Some(group) => group.indices.push(i),
                None => groups.push(SourceGroup {
                    language,
                    indices: vec![i],
                }),
            }
        }
        groups
    }

    /// Translate `texts` from `from` to `to`
    ///
    /// # Returns
    /// * `Result<Vec<String>, TranslationError>` - Translations in input order;
    ///   `UnsupportedLanguage` for codes the relay does not serve, and the first
    ///   failing group aborts the whole request
    pub async fn translate(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, TranslationError> {
        Self::check_languages(from, to)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = vec![String::new(); texts.len()];

        for group in self.group_by_source(from, texts) {
            let group_texts: Vec<String> = group.indices.iter().map(|&i| texts[i].clone()).collect();

            let translated = if group.language == to {
                debug!("{} text(s) already in {}, passing through", group_texts.len(), to);
                group_texts
            } else {
                self.translate_group(&group_texts, &group.language, to).await?
            };

            for (i, text) in group.indices.into_iter().zip(translated) {
                results[i] = text;
            }
        }

        Ok(results)
    }

    /// Reject codes outside the relay's table; `auto` is only valid as a source
    fn check_languages(from: &str, to: &str) -> Result<(), TranslationError> {
        if from != AUTO_DETECT && !language_utils::is_supported_code(from) {
            return Err(TranslationError::UnsupportedLanguage(from.to_string()));
        }
        if to == AUTO_DETECT || !language_utils::is_supported_code(to) {
            return Err(TranslationError::UnsupportedLanguage(to.to_string()));
        }
        Ok(())
    }

    /// Protect, send and restore one group of texts sharing a source language
    async fn translate_group(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let protected: Vec<ProtectedText> = if self.options.protect_tags {
            texts.iter().map(|t| TagProtector::encode(t)).collect()
        } else {
            texts
                .iter()
                .map(|t| ProtectedText {
                    cleaned: t.clone(),
                    tokens: Vec::new(),
                })
                .collect()
        };
        let cleaned: Vec<String> = protected.iter().map(|p| p.cleaned.clone()).collect();

        let translated = match &self.backend {
            Backend::Endpoints {
                configuration,
                client,
            } => {
                let endpoint = configuration.select(from, to);
                debug!("Sending {} text(s) {} -> {} to {}", cleaned.len(), from, to, endpoint);
                client.translate(endpoint, &cleaned, from, to).await?
            }
            Backend::Local(router) => router.translate(&cleaned, from, to).await?,
        };

        if translated.len() != texts.len() {
            return Err(TranslationError::LengthMismatch {
                expected: texts.len(),
                actual: translated.len(),
            });
        }

        if !self.options.protect_tags {
            return Ok(translated);
        }

        Ok(translated
            .iter()
            .zip(&protected)
            .map(|(text, p)| TagProtector::decode(text, &p.tokens))
            .collect())
    }
}
