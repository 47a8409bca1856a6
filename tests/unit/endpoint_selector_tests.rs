/*!
 * Tests for weighted endpoint selection
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

use translate_relay::endpoint_selector::EndpointConfiguration;
use translate_relay::errors::ConfigurationError;
use crate::common::{language_list, two_endpoint_configuration};

fn count_selections(conf: &EndpointConfiguration, from: &str, to: &str, draws: usize, seed: u64) -> HashMap<String, usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut counts = HashMap::new();
    for _ in 0..draws {
        *counts.entry(conf.select_with(from, to, &mut rng).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Test the per-pair weight map built from the endpoint language lists
#[test]
fn test_new_withTwoEndpoints_shouldBuildPairWeights() {
    let conf = two_endpoint_configuration([0.5, 0.5]);

    assert_eq!(conf.endpoints(), &["endpoint1.com".to_string(), "endpoint2.com".to_string()]);
    assert_eq!(conf.default_weights(), &[0.5, 0.5]);

    let only_first: HashMap<String, f64> = [("endpoint1.com".to_string(), 0.5)].into();
    let only_second: HashMap<String, f64> = [("endpoint2.com".to_string(), 0.5)].into();
    let both: HashMap<String, f64> =
        [("endpoint1.com".to_string(), 0.5), ("endpoint2.com".to_string(), 0.5)].into();

    assert_eq!(conf.pair_weights("en", "it"), Some(&only_first));
    assert_eq!(conf.pair_weights("it", "en"), Some(&only_first));
    assert_eq!(conf.pair_weights("en", "de"), Some(&only_second));
    assert_eq!(conf.pair_weights("de", "en"), Some(&only_second));
    assert_eq!(conf.pair_weights("en", "es"), Some(&both));
    assert_eq!(conf.pair_weights("es", "en"), Some(&both));

    // it and de are never offered by the same endpoint
    assert_eq!(conf.pair_weights("it", "de"), None);
    assert!(!conf.supports_pair("it", "de"));
    assert!(conf.supports_pair("de", "es"));
}

/// Test that the language catalog is the union of every endpoint's languages
#[test]
fn test_new_withTwoEndpoints_shouldMergeLanguageCatalog() {
    let conf = two_endpoint_configuration([0.5, 0.5]);
    let languages = conf.languages();

    let sources: Vec<&str> = languages.sl.keys().map(|k| k.as_str()).collect();
    let targets: Vec<&str> = languages.tl.keys().map(|k| k.as_str()).collect();
    assert_eq!(sources, vec!["de", "en", "es", "it"]);
    assert_eq!(targets, vec!["de", "en", "es", "it"]);
    assert_eq!(languages.sl.get("de").map(|s| s.as_str()), Some("DE"));
}

/// Test that mismatched input lengths are rejected
#[test]
fn test_new_withMismatchedLengths_shouldFailWithConfigurationError() {
    let result = EndpointConfiguration::new(
        vec!["a".to_string(), "b".to_string()],
        vec![1.0],
        &[language_list(&["en"]), language_list(&["en"])],
    );
    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::LengthMismatch { endpoints: 2, weights: 1, language_lists: 2 }
    );

    let result = EndpointConfiguration::new(
        vec!["a".to_string()],
        vec![1.0],
        &[language_list(&["en"]), language_list(&["es"])],
    );
    assert!(matches!(result, Err(ConfigurationError::LengthMismatch { language_lists: 2, .. })));
}

/// Test that an empty endpoint list and unusable weights are rejected
#[test]
fn test_new_withNoEndpointsOrBadWeights_shouldFail() {
    let result = EndpointConfiguration::new(Vec::new(), Vec::new(), &[]);
    assert_eq!(result.unwrap_err(), ConfigurationError::NoEndpoints);

    for bad in [-0.5, f64::NAN, f64::INFINITY] {
        let result = EndpointConfiguration::new(
            vec!["a".to_string()],
            vec![bad],
            &[language_list(&["en", "es"])],
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidWeight { .. })), "weight {} accepted", bad);
    }
}

/// Test that equal weights split traffic evenly over 2000 draws
#[test]
fn test_select_withEqualWeights_shouldSplitRoughlyEvenly() {
    let conf = two_endpoint_configuration([0.5, 0.5]);

    let mut count_one = 0;
    let mut count_two = 0;
    for _ in 0..2000 {
        match conf.select("en", "es") {
            "endpoint1.com" => count_one += 1,
            "endpoint2.com" => count_two += 1,
            other => panic!("unexpected endpoint {}", other),
        }
    }

    assert!(count_one > 800 && count_one < 1200, "endpoint1 selected {} times", count_one);
    assert!(count_two > 800 && count_two < 1200, "endpoint2 selected {} times", count_two);
}

/// Test weighted fairness over 10,000 draws with a seeded generator
#[test]
fn test_select_withSkewedWeights_shouldMatchWeightRatio() {
    let conf = two_endpoint_configuration([0.2, 0.8]);
    let counts = count_selections(&conf, "en", "es", 10_000, 42);

    let one = counts.get("endpoint1.com").copied().unwrap_or(0);
    let two = counts.get("endpoint2.com").copied().unwrap_or(0);
    assert_eq!(one + two, 10_000);
    assert!((1_800..=2_200).contains(&one), "endpoint1 selected {} times", one);
    assert!((7_800..=8_200).contains(&two), "endpoint2 selected {} times", two);
}

/// Test that a zero-weight endpoint is never chosen while others carry weight
#[test]
fn test_select_withZeroWeightEndpoint_shouldNeverChooseIt() {
    let conf = EndpointConfiguration::new(
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        vec![0.0, 3.0, 1.0],
        &[language_list(&["en", "fr"]), language_list(&["en", "fr"]), language_list(&["en", "fr"])],
    )
    .unwrap();

    let counts = count_selections(&conf, "en", "fr", 10_000, 7);
    assert_eq!(counts.get("a"), None);

    let b = counts.get("b").copied().unwrap_or(0);
    assert!((7_000..=8_000).contains(&b), "b selected {} times", b);
}

/// Test that a pair only one endpoint supports always goes to that endpoint
#[test]
fn test_select_withSingleSupporter_shouldAlwaysChooseIt() {
    let conf = two_endpoint_configuration([0.5, 0.5]);

    for _ in 0..100 {
        assert_eq!(conf.select("en", "it"), "endpoint1.com");
        assert_eq!(conf.select("en", "de"), "endpoint2.com");
    }
}

/// Test that an unknown pair falls back to the first endpoint
#[test]
fn test_select_withUnknownPair_shouldFallBackToFirstEndpoint() {
    let conf = two_endpoint_configuration([0.5, 0.5]);

    for _ in 0..100 {
        assert_eq!(conf.select("ja", "ko"), "endpoint1.com");
        assert_eq!(conf.select("it", "de"), "endpoint1.com");
    }
}

/// Test that a configuration can be shared between threads without locking
#[test]
fn test_select_fromManyThreads_shouldOnlyReturnSupportingEndpoints() {
    let conf = std::sync::Arc::new(two_endpoint_configuration([0.5, 0.5]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let conf = conf.clone();
            std::thread::spawn(move || {
                (0..500).all(|_| conf.select("de", "en") == "endpoint2.com")
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
