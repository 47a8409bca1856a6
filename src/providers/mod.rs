/*!
 * Backend seams consumed by the relay.
 *
 * The relay never talks to a translation backend directly. It goes through the
 * traits defined here:
 * - `TranslationEngine`: an on-box engine holding one model per language pair
 * - `EndpointClient`: the transport to a remote vendor endpoint
 * - `LanguageDetector`: source language detection for `auto` requests
 *
 * The `mock` module provides in-memory implementations of all three.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Batch text translation by a local engine with per-pair models
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Translate `texts` from `from` to `to`
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, in input order
    async fn translate_batch(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Batch text translation against a chosen vendor endpoint
#[async_trait]
pub trait EndpointClient: Send + Sync + Debug {
    /// Translate `texts` from `from` to `to` on `endpoint`
    ///
    /// `from` may be `auto`, in which case the endpoint detects the language.
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, in input order
    async fn translate(
        &self,
        endpoint: &str,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Source language detection
pub trait LanguageDetector: Send + Sync + Debug {
    /// Detect the language of `text`, if it can be determined
    fn detect(&self, text: &str) -> Option<String>;
}

pub mod mock;
