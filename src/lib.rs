/*!
 * # translate-relay
 *
 * Core of a translation relay sitting between Google Translate clients and
 * several machine-translation backends.
 *
 * ## Features
 *
 * - Weighted traffic split between vendor endpoints, per language pair
 * - Markup protection so markup-unaware engines keep inline tags intact
 * - Pivot routing through English for on-box engines with per-pair models
 * - Merged language catalog in the Google client format
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `endpoint_selector`: Weighted endpoint selection per language pair
 * - `translation`: Translation building blocks:
 *   - `translation::tags`: Markup protection
 *   - `translation::pivot`: Direct or two-hop model routing
 * - `translation_service`: Request orchestration over the building blocks
 * - `language_utils`: Language catalog and code utilities
 * - `providers`: Backend traits and mock implementations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod endpoint_selector;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod translation_service;

// Re-export main types for easier usage
pub use app_config::Config;
pub use endpoint_selector::EndpointConfiguration;
pub use errors::{AppError, ConfigurationError, ProviderError, TranslationError};
pub use language_utils::{LanguageList, get_language_name, language_codes_match};
pub use translation::{PivotPath, PivotTranslationRouter, TagProtector};
pub use translation_service::{Backend, TranslationOptions, TranslationService};
