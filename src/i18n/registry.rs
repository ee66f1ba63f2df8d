//! Culture registry: the set of language identities a header cell may name.
//!
//! Header rows routinely carry decorative text next to the culture columns, so a
//! syntactically valid language subtag is not enough to count as a culture. Only
//! languages listed here are recognised. The registry is immutable static data,
//! initialised once on first access.

use std::sync::OnceLock;

/// Metadata for a known language.
#[derive(Debug, Clone)]
pub struct CultureInfo {
    /// ISO 639-1 language code (e.g., "en", "sv")
    pub code: &'static str,

    /// English name of the language (e.g., "Swedish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Svenska")
    pub native_name: &'static str,
}

pub struct CultureRegistry {
    languages: Vec<CultureInfo>,
}

static REGISTRY: OnceLock<CultureRegistry> = OnceLock::new();

impl CultureRegistry {
    /// Get the global culture registry instance.
    pub fn get() -> &'static CultureRegistry {
        REGISTRY.get_or_init(|| CultureRegistry {
            languages: known_languages(),
        })
    }

    /// Look up a language by its code (case-insensitive).
    pub fn get_by_code(&self, code: &str) -> Option<&CultureInfo> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    pub fn list_all(&self) -> Vec<&CultureInfo> {
        self.languages.iter().collect()
    }
}

macro_rules! language {
    ($code:literal, $name:literal, $native:literal) => {
        CultureInfo {
            code: $code,
            name: $name,
            native_name: $native,
        }
    };
}

fn known_languages() -> Vec<CultureInfo> {
    vec![
        language!("af", "Afrikaans", "Afrikaans"),
        language!("am", "Amharic", "አማርኛ"),
        language!("ar", "Arabic", "العربية"),
        language!("az", "Azerbaijani", "Azərbaycan"),
        language!("be", "Belarusian", "Беларуская"),
        language!("bg", "Bulgarian", "Български"),
        language!("bn", "Bangla", "বাংলা"),
        language!("bs", "Bosnian", "Bosanski"),
        language!("ca", "Catalan", "Català"),
        language!("cs", "Czech", "Čeština"),
        language!("cy", "Welsh", "Cymraeg"),
        language!("da", "Danish", "Dansk"),
        language!("de", "German", "Deutsch"),
        language!("el", "Greek", "Ελληνικά"),
        language!("en", "English", "English"),
        language!("es", "Spanish", "Español"),
        language!("et", "Estonian", "Eesti"),
        language!("eu", "Basque", "Euskara"),
        language!("fa", "Persian", "فارسی"),
        language!("fi", "Finnish", "Suomi"),
        language!("fo", "Faroese", "Føroyskt"),
        language!("fr", "French", "Français"),
        language!("ga", "Irish", "Gaeilge"),
        language!("gl", "Galician", "Galego"),
        language!("gu", "Gujarati", "ગુજરાતી"),
        language!("he", "Hebrew", "עברית"),
        language!("hi", "Hindi", "हिन्दी"),
        language!("hr", "Croatian", "Hrvatski"),
        language!("hu", "Hungarian", "Magyar"),
        language!("hy", "Armenian", "Հայերեն"),
        language!("id", "Indonesian", "Indonesia"),
        language!("is", "Icelandic", "Íslenska"),
        language!("it", "Italian", "Italiano"),
        language!("ja", "Japanese", "日本語"),
        language!("ka", "Georgian", "ქართული"),
        language!("kk", "Kazakh", "Қазақ"),
        language!("km", "Khmer", "ខ្មែរ"),
        language!("kn", "Kannada", "ಕನ್ನಡ"),
        language!("ko", "Korean", "한국어"),
        language!("lt", "Lithuanian", "Lietuvių"),
        language!("lv", "Latvian", "Latviešu"),
        language!("mk", "Macedonian", "Македонски"),
        language!("ml", "Malayalam", "മലയാളം"),
        language!("mn", "Mongolian", "Монгол"),
        language!("mr", "Marathi", "मराठी"),
        language!("ms", "Malay", "Melayu"),
        language!("mt", "Maltese", "Malti"),
        language!("nb", "Norwegian Bokmål", "Norsk bokmål"),
        language!("nl", "Dutch", "Nederlands"),
        language!("nn", "Norwegian Nynorsk", "Nynorsk"),
        language!("no", "Norwegian", "Norsk"),
        language!("pa", "Punjabi", "ਪੰਜਾਬੀ"),
        language!("pl", "Polish", "Polski"),
        language!("pt", "Portuguese", "Português"),
        language!("ro", "Romanian", "Română"),
        language!("ru", "Russian", "Русский"),
        language!("sk", "Slovak", "Slovenčina"),
        language!("sl", "Slovenian", "Slovenščina"),
        language!("sq", "Albanian", "Shqip"),
        language!("sr", "Serbian", "Српски"),
        language!("sv", "Swedish", "Svenska"),
        language!("sw", "Kiswahili", "Kiswahili"),
        language!("ta", "Tamil", "தமிழ்"),
        language!("te", "Telugu", "తెలుగు"),
        language!("th", "Thai", "ไทย"),
        language!("tr", "Turkish", "Türkçe"),
        language!("uk", "Ukrainian", "Українська"),
        language!("ur", "Urdu", "اردو"),
        language!("uz", "Uzbek", "O‘zbek"),
        language!("vi", "Vietnamese", "Tiếng Việt"),
        language!("zh", "Chinese", "中文"),
        language!("zu", "isiZulu", "isiZulu"),
    ]
}
