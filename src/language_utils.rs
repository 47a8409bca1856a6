use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language utilities for the relay's language catalog
///
/// This module holds the Google-client language list format, the table of
/// language codes the relay accepts, and helpers for comparing codes through
/// their ISO 639 forms.

/// Language code used for the `sl` parameter when the client asks the backend
/// to detect the source language
pub const AUTO_DETECT: &str = "auto";

/// Language list in the Google translate client format
///
/// ```json
/// {"sl": {"auto": "Auto", "af": "Afrikaans"}, "tl": {"af": "Afrikaans"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageList {
    /// Source languages, code to display name
    #[serde(default)]
    pub sl: BTreeMap<String, String>,

    /// Target languages, code to display name
    #[serde(default)]
    pub tl: BTreeMap<String, String>,
}

impl LanguageList {
    /// Create a list that offers the same languages as sources and targets
    pub fn symmetric<I, K, V>(languages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let sl: BTreeMap<String, String> = languages
            .into_iter()
            .map(|(code, name)| (code.into(), name.into()))
            .collect();
        Self { tl: sl.clone(), sl }
    }

    /// Add every source and target language of `other` to this list
    ///
    /// Names already present are overwritten by the later list, matching the
    /// order endpoints are merged in.
    pub fn merge(&mut self, other: &LanguageList) {
        for (code, name) in &other.sl {
            self.sl.insert(code.clone(), name.clone());
        }
        for (code, name) in &other.tl {
            self.tl.insert(code.clone(), name.clone());
        }
    }

    /// Check whether `(from, to)` is in the cross product of this list
    pub fn supports_pair(&self, from: &str, to: &str) -> bool {
        self.sl.contains_key(from) && self.tl.contains_key(to)
    }

    pub fn is_empty(&self) -> bool {
        self.sl.is_empty() && self.tl.is_empty()
    }
}

/// Codes accepted by the relay, with their display names.
/// `auto` is accepted as a source only.
static SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("auto", "Auto"),
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("ceb", "Cebuano"),
    ("co", "Corsican"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("eo", "Esperanto"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("fy", "Frisian"),
    ("ga", "Irish"),
    ("gd", "Scots Gaelic"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("ha", "Hausa"),
    ("haw", "Hawaiian"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hmn", "Hmong"),
    ("hr", "Croatian"),
    ("ht", "Haitian Creole"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("ig", "Igbo"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("jv", "Javanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("ku", "Kurdish (Kurmanji)"),
    ("ky", "Kyrgyz"),
    ("la", "Latin"),
    ("lb", "Luxembourgish"),
    ("lo", "Lao"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mg", "Malagasy"),
    ("mi", "Maori"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("my", "Myanmar (Burmese)"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("ny", "Chichewa"),
    ("or", "Odia"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("ps", "Pashto"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("rw", "Kinyarwanda"),
    ("sd", "Sindhi"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sm", "Samoan"),
    ("sn", "Shona"),
    ("so", "Somali"),
    ("sq", "Albanian"),
    ("sr-Cyrl", "Serbian Cyrilic"),
    ("st", "Sesotho"),
    ("su", "Sundanese"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("tg", "Tajik"),
    ("th", "Thai"),
    ("tk", "Turkmen"),
    ("tl", "Tagalog"),
    ("tr", "Turkish"),
    ("tt", "Tatar"),
    ("ug", "Uyghur"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("xh", "Xhosa"),
    ("yi", "Yiddish"),
    ("yo", "Yoruba"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-Hans", "Chinese (Simplified)"),
    ("zh-Hant", "Chinese (Traditional)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("zu", "Zulu"),
];

/// Check if a code is one the relay accepts (exact, case-sensitive match)
pub fn is_supported_code(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Validate a language code, returning it unchanged when supported
pub fn validate_language_code(code: &str) -> Result<&str> {
    if is_supported_code(code) {
        Ok(code)
    } else {
        Err(anyhow!("No matching language code: {}", code))
    }
}

/// Full catalog of supported languages in the Google client format
///
/// `auto` only appears in the source list.
pub fn supported_language_list() -> LanguageList {
    let mut list = LanguageList::default();
    for (code, name) in SUPPORTED_LANGUAGES {
        list.sl.insert(code.to_string(), name.to_string());
        if *code != AUTO_DETECT {
            list.tl.insert(code.to_string(), name.to_string());
        }
    }
    list
}

/// Normalize a language code to ISO 639-3 form
///
/// Region and script subtags (`zh-CN`, `sr-Cyrl`) are ignored.
pub fn normalize_to_part3(code: &str) -> Result<String> {
    let primary = code
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let lang = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    };

    lang.map(|l| l.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part3(code1), normalize_to_part3(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the display name of a language code
pub fn get_language_name(code: &str) -> Result<String> {
    if let Some((_, name)) = SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == code) {
        return Ok(name.to_string());
    }

    let normalized = normalize_to_part3(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
