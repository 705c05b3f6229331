//! Language menu and the saved language preference.

use anyhow::{Context, Result};
use colored::Colorize;
use shared::language::{Locale, Translator, get_language_info, supported_languages};

use super::AppContext;

/// "🇪🇸 Español".
pub(crate) fn native_name(locale: Locale) -> String {
    let info = get_language_info(locale);
    format!("{} {}", info.flag, info.native_name)
}

/// Lines of the language menu with the active entry marked.
pub(crate) fn language_menu(active: Locale) -> Vec<String> {
    supported_languages()
        .into_iter()
        .map(|info| {
            let entry = format!("{} {} ({})", info.flag, info.native_name, info.locale.code());
            if info.locale == active {
                format!("* {}", entry.bold())
            } else {
                format!("  {entry}")
            }
        })
        .collect()
}

/// `coach lang [CODE]`: shows the menu, or saves `code` as the preferred
/// language.
///
/// # Errors
/// Fails for unknown codes or when the preference cannot be written.
pub fn run(ctx: &AppContext, code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        println!("{}", ctx.translator.t("languageLabel"));
        for line in language_menu(ctx.translator.locale()) {
            println!("{line}");
        }
        return Ok(());
    };

    let locale: Locale = code.parse().map_err(anyhow::Error::msg)?;
    ctx.preferences
        .set_language(locale)
        .with_context(|| format!("failed to save {}", ctx.preferences.path().display()))?;
    let translator = Translator::new(locale);
    println!(
        "{}",
        translator.format("languageSet", &[("language", native_name(locale).as_str())])
    );
    Ok(())
}
