/*!
 * Translation building blocks used by the relay.
 *
 * - `tags`: markup protection around markup-unaware backends
 * - `pivot`: direct or two-hop routing over an on-box engine's installed models
 */

// Re-export main types for easier usage
pub use self::pivot::{FsModelRegistry, ModelRegistry, PivotPath, PivotTranslationRouter, PIVOT_LANGUAGE};
pub use self::tags::{ProtectedText, TagProtector, PLACEHOLDER};

// Submodules
pub mod pivot;
pub mod tags;
