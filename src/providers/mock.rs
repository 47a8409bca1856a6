/*!
 * Mock backend implementations for testing and dry runs.
 *
 * `MockBackend` implements both `TranslationEngine` and `EndpointClient`:
 * - `MockBackend::working()` - Always succeeds, tagging each text with the pair
 * - `MockBackend::intermittent(n)` - Fails every Nth request
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::failing_on(from, to)` - Fails only for one language pair
 *
 * Every call is recorded so tests can check which hops and endpoints were used.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{EndpointClient, LanguageDetector, TranslationEngine};

/// A request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Endpoint the request was sent to, `None` for engine calls
    pub endpoint: Option<String>,
    /// Texts to translate
    pub texts: Vec<String>,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request, never when N is 0)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Fails only for the given pair
    FailingOn { from: String, to: String },
    /// Returns one text fewer than requested
    DropsLast,
}

/// Mock backend recording every call it receives
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Calls received so far
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &str, &str) -> String>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock backend; `0` never fails
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock backend that fails only for `from -> to`
    pub fn failing_on(from: &str, to: &str) -> Self {
        Self::new(MockBehavior::FailingOn {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Create a mock backend that loses the last text of every batch
    pub fn drops_last() -> Self {
        Self::new(MockBehavior::DropsLast)
    }

    /// Set a custom response generator taking `(text, from, to)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of calls per endpoint
    pub fn endpoint_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for call in self.calls() {
            if let Some(endpoint) = call.endpoint {
                *counts.entry(endpoint).or_insert(0) += 1;
            }
        }
        counts
    }

    fn respond(
        &self,
        endpoint: Option<&str>,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                endpoint: endpoint.map(str::to_string),
                texts: texts.to_vec(),
                source_language: from.to_string(),
                target_language: to.to_string(),
            });
        }

        match &self.behavior {
            MockBehavior::Working => Ok(self.translate_all(texts, from, to)),

            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.translate_all(texts, from, to))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated backend failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailingOn {
                from: fail_from,
                to: fail_to,
            } => {
                if fail_from == from && fail_to == to {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated failure for {} -> {}",
                        from, to
                    )))
                } else {
                    Ok(self.translate_all(texts, from, to))
                }
            }

            MockBehavior::DropsLast => {
                let mut translated = self.translate_all(texts, from, to);
                translated.pop();
                Ok(translated)
            }
        }
    }

    fn translate_all(&self, texts: &[String], from: &str, to: &str) -> Vec<String> {
        texts
            .iter()
            .map(|text| match self.custom_response {
                Some(generator) => generator(text, from, to),
                None => format!("[{}>{}] {}", from, to, text),
            })
            .collect()
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationEngine for MockBackend {
    async fn translate_batch(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.respond(None, texts, from, to)
    }
}

#[async_trait]
impl EndpointClient for MockBackend {
    async fn translate(
        &self,
        endpoint: &str,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.respond(Some(endpoint), texts, from, to)
    }
}

/// Language detector returning a fixed answer per text
#[derive(Debug, Default, Clone)]
pub struct MockDetector {
    /// Detected language for specific texts
    known: HashMap<String, String>,
    /// Answer for texts not in `known`
    fallback: Option<String>,
}

impl MockDetector {
    /// Create a detector answering `language` for every text
    pub fn always(language: &str) -> Self {
        Self {
            known: HashMap::new(),
            fallback: Some(language.to_string()),
        }
    }

    /// Answer `language` for `text`
    pub fn with(mut self, text: &str, language: &str) -> Self {
        self.known.insert(text.to_string(), language.to_string());
        self
    }
}

impl LanguageDetector for MockDetector {
    fn detect(&self, text: &str) -> Option<String> {
        self.known.get(text).cloned().or_else(|| self.fallback.clone())
    }
}
