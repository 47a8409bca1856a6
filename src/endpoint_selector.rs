/*!
 * Weighted endpoint selection.
 *
 * An `EndpointConfiguration` records, for every language pair, which backend
 * endpoints can serve it and with what weight. Each request draws one endpoint
 * with probability proportional to its weight for the requested pair.
 *
 * The configuration is built once at startup and never mutated afterwards, so it
 * can be shared between request handlers through an `Arc` without locking.
 */

use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashMap;

use crate::errors::ConfigurationError;
use crate::language_utils::LanguageList;

/// Endpoint weights keyed by source language, then target language, then endpoint
pub type PairWeights = HashMap<String, HashMap<String, HashMap<String, f64>>>;

/// Endpoints, their weights and the languages they support
#[derive(Debug, Clone)]
pub struct EndpointConfiguration {
    /// Endpoint identifiers, in the fixed order used for sampling
    endpoints: Vec<String>,

    /// Default weight of each endpoint, parallel to `endpoints`
    default_weights: Vec<f64>,

    /// Union of every endpoint's source and target languages
    languages: LanguageList,

    /// Weight of each endpoint for each language pair it supports
    pair_weights: PairWeights,
}

impl EndpointConfiguration {
    /// Build a configuration from parallel lists of endpoints, weights and
    /// supported language lists
    ///
    /// # Arguments
    /// * `endpoints` - Endpoint identifiers (usually base URLs), in sampling order
    /// * `weights` - Default weight of each endpoint
    /// * `language_lists` - Languages each endpoint advertises
    ///
    /// # Returns
    /// * `Result<Self, ConfigurationError>` - The configuration, or an error if the
    ///   inputs have different lengths, are empty or carry an unusable weight
    pub fn new(
        endpoints: Vec<String>,
        weights: Vec<f64>,
        language_lists: &[LanguageList],
    ) -> Result<Self, ConfigurationError> {
        if endpoints.len() != weights.len() || weights.len() != language_lists.len() {
            return Err(ConfigurationError::LengthMismatch {
                endpoints: endpoints.len(),
                weights: weights.len(),
                language_lists: language_lists.len(),
            });
        }

        if endpoints.is_empty() {
            return Err(ConfigurationError::NoEndpoints);
        }

        if let Some((endpoint, weight)) = endpoints
            .iter()
            .zip(&weights)
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(ConfigurationError::InvalidWeight {
                endpoint: endpoint.clone(),
                weight: *weight,
            });
        }

        let mut languages = LanguageList::default();
        let mut pair_weights: PairWeights = HashMap::new();

        for (i, endpoint) in endpoints.iter().enumerate() {
            let list = &language_lists[i];
            languages.merge(list);

            for sl in list.sl.keys() {
                let targets = pair_weights.entry(sl.clone()).or_default();
                for tl in list.tl.keys() {
                    targets
                        .entry(tl.clone())
                        .or_default()
                        .insert(endpoint.clone(), weights[i]);
                }
            }
        }

        info!(
            "Endpoint configuration ready: {} endpoint(s), {} source and {} target languages",
            endpoints.len(),
            languages.sl.len(),
            languages.tl.len()
        );

        Ok(Self {
            endpoints,
            default_weights: weights,
            languages,
            pair_weights,
        })
    }

    /// Choose the endpoint that should serve `from -> to`
    pub fn select(&self, from: &str, to: &str) -> &str {
        self.select_with(from, to, &mut rand::rng())
    }

    /// Choose the endpoint that should serve `from -> to` using the given random source
    ///
    /// Endpoints are visited in construction order while accumulating their weight
    /// for the pair; a uniform draw in `[0, total)` picks the first endpoint whose
    /// cumulative weight exceeds it. When no endpoint supports the pair the first
    /// endpoint is returned.
    pub fn select_with<R: Rng + ?Sized>(&self, from: &str, to: &str, rng: &mut R) -> &str {
        let weights = self.pair_weights.get(from).and_then(|targets| targets.get(to));

        let mut total = 0.0;
        let mut incrementals = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            total += weights.and_then(|w| w.get(endpoint)).copied().unwrap_or(0.0);
            incrementals.push(total);
        }

        if total <= 0.0 {
            warn!(
                "No endpoint weight for {} -> {}, falling back to {}",
                from, to, self.endpoints[0]
            );
            return &self.endpoints[0];
        }

        let r = rng.random::<f64>() * total;

        if let Some(i) = incrementals.iter().position(|incremental| r < *incremental) {
            debug!("Selected endpoint {} for {} -> {}", self.endpoints[i], from, to);
            return &self.endpoints[i];
        }

        // Only reachable if `r` rounds up to `total`; take the last endpoint that
        // carries weight so a zero-weight endpoint is never chosen.
        let last = incrementals
            .iter()
            .enumerate()
            .rev()
            .find(|(i, incremental)| *i == 0 || **incremental > incrementals[*i - 1])
            .map_or(0, |(i, _)| i);
        &self.endpoints[last]
    }

    /// Endpoint identifiers in sampling order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Default weight of each endpoint, parallel to `endpoints()`
    pub fn default_weights(&self) -> &[f64] {
        &self.default_weights
    }

    /// Merged language catalog of all endpoints
    pub fn languages(&self) -> &LanguageList {
        &self.languages
    }

    /// Weight of each endpoint supporting `from -> to`, if any does
    pub fn pair_weights(&self, from: &str, to: &str) -> Option<&HashMap<String, f64>> {
        self.pair_weights.get(from).and_then(|targets| targets.get(to))
    }

    /// Check whether any endpoint supports `from -> to`
    pub fn supports_pair(&self, from: &str, to: &str) -> bool {
        self.pair_weights(from, to)
            .is_some_and(|weights| weights.values().any(|w| *w > 0.0))
    }
}
