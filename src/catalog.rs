//! Target language and voice preset catalogs.
//!
//! The dubbing services accept many more languages than listed here; the
//! catalog is the set redub offers and validates against.

/// A selectable target language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageInfo {
    /// ISO-639-1 style code sent to the translation service (e.g., "es")
    pub code: &'static str,
    /// English display name, also used in the translation instruction
    pub name: &'static str,
}

/// A selectable speech synthesis voice preset.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    /// Preset identifier sent to the speech service
    pub name: &'static str,
    /// Short description for listings
    pub description: &'static str,
}

pub const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "es", name: "Spanish" },
    LanguageInfo { code: "fr", name: "French" },
    LanguageInfo { code: "de", name: "German" },
    LanguageInfo { code: "it", name: "Italian" },
    LanguageInfo { code: "pt", name: "Portuguese" },
    LanguageInfo { code: "nl", name: "Dutch" },
    LanguageInfo { code: "pl", name: "Polish" },
    LanguageInfo { code: "ru", name: "Russian" },
    LanguageInfo { code: "uk", name: "Ukrainian" },
    LanguageInfo { code: "tr", name: "Turkish" },
    LanguageInfo { code: "ar", name: "Arabic" },
    LanguageInfo { code: "hi", name: "Hindi" },
    LanguageInfo { code: "ja", name: "Japanese" },
    LanguageInfo { code: "ko", name: "Korean" },
    LanguageInfo { code: "zh", name: "Chinese" },
    LanguageInfo { code: "en", name: "English" },
];

/// Voice presets, in display order. The first entry is the default.
pub const VOICES: &[VoiceInfo] = &[
    VoiceInfo { name: "alloy", description: "neutral, balanced" },
    VoiceInfo { name: "echo", description: "warm, male" },
    VoiceInfo { name: "fable", description: "expressive, British" },
    VoiceInfo { name: "onyx", description: "deep, male" },
    VoiceInfo { name: "nova", description: "bright, female" },
    VoiceInfo { name: "shimmer", description: "soft, female" },
];

/// Find a language by code (case-insensitive).
pub fn get_language(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Find a voice preset by name (case-insensitive).
pub fn get_voice(name: &str) -> Option<&'static VoiceInfo> {
    VOICES.iter().find(|v| v.name.eq_ignore_ascii_case(name))
}

/// The default voice preset (first in the catalog).
pub fn default_voice() -> &'static VoiceInfo {
    &VOICES[0]
}
