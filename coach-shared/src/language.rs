//! Bilingual string table and locale handling.
//!
//! Tables are flat JSON objects embedded at compile time. Lookups fall back
//! from the active locale to English and finally to the key itself, so a
//! missing entry renders as its key rather than as nothing.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use tracing::error;

type Table = HashMap<String, String>;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English, the fallback for missing entries.
    #[default]
    En,
    /// Spanish.
    Es,
}

impl Locale {
    /// Two-letter code used on the wire and in preference files.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Every locale in menu order.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::En, Self::Es]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(format!("unsupported language '{other}' (expected en or es)")),
        }
    }
}

/// Information about a supported language
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LanguageInfo {
    /// The language described.
    pub locale: Locale,
    /// Flag emoji shown in the menu.
    pub flag: &'static str,
    /// Raw JSON string table.
    pub translation: &'static str,
    /// Name of the language in itself.
    pub native_name: &'static str,
}

/// Get information about a supported language
#[must_use]
pub fn get_language_info(locale: Locale) -> LanguageInfo {
    match locale {
        Locale::En => LanguageInfo {
            locale,
            flag: "🇬🇧",
            translation: include_str!("../translations/en.json"),
            native_name: "English",
        },
        Locale::Es => LanguageInfo {
            locale,
            flag: "🇪🇸",
            translation: include_str!("../translations/es.json"),
            native_name: "Español",
        },
    }
}

/// Get the supported languages in menu order
#[must_use]
pub fn supported_languages() -> Vec<LanguageInfo> {
    Locale::all().into_iter().map(get_language_info).collect()
}

fn parse_table(locale: Locale) -> Table {
    let info = get_language_info(locale);
    serde_json::from_str(info.translation).unwrap_or_else(|err| {
        error!(locale = %locale, error = %err, "embedded translation table is malformed");
        Table::new()
    })
}

fn table(locale: Locale) -> &'static Table {
    static EN: OnceLock<Table> = OnceLock::new();
    static ES: OnceLock<Table> = OnceLock::new();
    match locale {
        Locale::En => EN.get_or_init(|| parse_table(Locale::En)),
        Locale::Es => ES.get_or_init(|| parse_table(Locale::Es)),
    }
}

/// Translation accessor bound to one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    /// Binds a translator to `locale`.
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// The bound locale.
    #[must_use]
    pub const fn locale(self) -> Locale {
        self.locale
    }

    /// Looks up `key` in the active table, then English, then returns `key`.
    #[must_use]
    pub fn t(self, key: &str) -> String {
        table(self.locale)
            .get(key)
            .or_else(|| table(Locale::En).get(key))
            .map_or_else(|| key.to_string(), Clone::clone)
    }

    /// Looks up `key` and substitutes `{name}` placeholders.
    ///
    /// Substitution is a single pass over the template, so placeholders that
    /// appear inside a substituted value are left alone. Unknown placeholders
    /// stay as written.
    #[must_use]
    pub fn format(self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self.t(key);
        let mut out = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let substitution = tail.find('}').and_then(|close| {
                let name = &tail[1..close];
                args.iter()
                    .find(|(arg, _)| *arg == name)
                    .map(|(_, value)| (*value, close))
            });
            if let Some((value, close)) = substitution {
                out.push_str(value);
                rest = &tail[close + 1..];
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
