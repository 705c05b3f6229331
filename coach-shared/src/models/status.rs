//! Status bar state: connection badge, notices and provider choice.

use std::time::Duration;

use super::documents::HealthResponse;
use crate::language::Translator;

/// How long a success notice stays visible.
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Connection indicator derived from the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    /// Backend answered and reported itself healthy.
    Online,
    /// Backend answered but is not healthy, or answered with garbage.
    Error,
    /// Backend could not be reached.
    Offline,
}

impl StatusBadge {
    /// Badge for a decoded health body.
    #[must_use]
    pub fn from_health(health: &HealthResponse) -> Self {
        if health.is_healthy() {
            Self::Online
        } else {
            Self::Error
        }
    }

    /// Key of the translated badge text.
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Online => "statusOnline",
            Self::Error => "statusError",
            Self::Offline => "statusOffline",
        }
    }

    /// Badge text in the translator's locale.
    #[must_use]
    pub fn label(self, translator: Translator) -> String {
        translator.t(self.translation_key())
    }
}

/// Tone of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Shown in green and hidden after [`SUCCESS_NOTICE_TTL`].
    Success,
    /// Shown in red until replaced.
    Error,
}

/// Inline status message shown after an upload or clear action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Tone.
    pub kind: NoticeKind,
    /// Translated message.
    pub text: String,
}

impl Notice {
    /// A notice that hides itself.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// A notice that stays until replaced.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Whether this reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    /// Success notices hide themselves; errors stay until replaced.
    #[must_use]
    pub fn auto_hide_after(&self) -> Option<Duration> {
        match self.kind {
            NoticeKind::Success => Some(SUCCESS_NOTICE_TTL),
            NoticeKind::Error => None,
        }
    }

    /// Whether the notice is still shown `elapsed` after it appeared.
    #[must_use]
    pub fn is_visible_after(&self, elapsed: Duration) -> bool {
        self.auto_hide_after().is_none_or(|ttl| elapsed < ttl)
    }
}

/// Providers the backend offers and the one the client will request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSelection {
    /// Providers listed by the backend, in its order.
    pub available: Vec<String>,
    /// Provider requested with each chat message.
    pub selected: Option<String>,
}

impl ProviderSelection {
    /// Picks `preferred`, then the backend default, then the first available.
    ///
    /// Names that are not in `available` are never selected.
    #[must_use]
    pub fn resolve(
        available: Vec<String>,
        default_provider: Option<&str>,
        preferred: Option<&str>,
    ) -> Self {
        let pick = |name: Option<&str>| {
            name.filter(|name| available.iter().any(|provider| provider == name))
                .map(ToString::to_string)
        };
        let selected = pick(preferred)
            .or_else(|| pick(default_provider))
            .or_else(|| available.first().cloned());
        Self {
            available,
            selected,
        }
    }

    /// Whether `name` may be selected. Anything goes while the backend has
    /// not listed its providers.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        self.available.is_empty() || self.available.iter().any(|provider| provider == name)
    }

    /// Selection derived from a health body, if it lists providers.
    #[must_use]
    pub fn from_health(health: &HealthResponse, preferred: Option<&str>) -> Self {
        Self::resolve(
            health.providers.clone().unwrap_or_default(),
            health.default_provider.as_deref(),
            preferred,
        )
    }
}
