//! The static resource directory.

use serde::{Deserialize, Serialize};

use crate::language::{Locale, Translator};

/// One entry of the static resource directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// English title.
    pub title: String,
    /// English description.
    pub description: String,
    /// Catalog category name, matched exactly by the category filter.
    pub category: String,
    /// Raw type name, see [`Resource::kind`].
    pub resource_type: String,
    /// Grade bands such as `K-5`.
    #[serde(default)]
    pub grade_levels: Vec<String>,
    /// Extra search terms.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// External link; blank values count as none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `California` or anything else, which is shown as national.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Spanish title.
    #[serde(default, rename = "title_es", skip_serializing_if = "Option::is_none")]
    pub title_es: Option<String>,
    /// Spanish description.
    #[serde(
        default,
        rename = "description_es",
        skip_serializing_if = "Option::is_none"
    )]
    pub description_es: Option<String>,
}

impl Resource {
    /// Case-insensitive substring match on title, description, or any keyword.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(needle))
    }

    /// Title in the requested locale, falling back to English.
    #[must_use]
    pub fn localized_title(&self, locale: Locale) -> &str {
        match (locale, self.title_es.as_deref()) {
            (Locale::Es, Some(title)) if !title.is_empty() => title,
            _ => &self.title,
        }
    }

    /// Description in the requested locale, falling back to English.
    #[must_use]
    pub fn localized_description(&self, locale: Locale) -> &str {
        match (locale, self.description_es.as_deref()) {
            (Locale::Es, Some(description)) if !description.is_empty() => description,
            _ => &self.description,
        }
    }

    /// The link target, if one is present and not blank.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Parsed resource type.
    #[must_use]
    pub fn kind(&self) -> ResourceType {
        ResourceType::from(self.resource_type.as_str())
    }

    /// Translated location badge, when the resource carries a location.
    #[must_use]
    pub fn location_label(&self, translator: Translator) -> Option<String> {
        self.location.as_deref().map(|location| {
            if location == "California" {
                translator.t("locationCalifornia")
            } else {
                translator.t("locationNational")
            }
        })
    }
}

/// Document shape of `/static/data/resources-web.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceCatalog {
    /// Entries in display order.
    pub resources: Vec<Resource>,
}

impl ResourceCatalog {
    /// Parses the catalog JSON document.
    ///
    /// # Errors
    /// Returns the decoding error when the document is malformed.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// The categories offered by the category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    /// Official Resources.
    Official,
    /// Trauma-Informed Education.
    TraumaInformed,
    /// Research & Evidence.
    Research,
    /// Practical Tools.
    Tools,
    /// Community Resources.
    Community,
}

impl ResourceCategory {
    /// All categories in filter-menu order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Official,
            Self::TraumaInformed,
            Self::Research,
            Self::Tools,
            Self::Community,
        ]
    }

    /// The category value as it appears in the catalog.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Official => "Official Resources",
            Self::TraumaInformed => "Trauma-Informed Education",
            Self::Research => "Research & Evidence",
            Self::Tools => "Practical Tools",
            Self::Community => "Community Resources",
        }
    }

    /// Key of the translated label.
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Official => "categoryOfficial",
            Self::TraumaInformed => "categoryTrauma",
            Self::Research => "categoryResearch",
            Self::Tools => "categoryTools",
            Self::Community => "categoryCommunity",
        }
    }

    /// Short style tag; unknown categories are styled as official.
    #[must_use]
    pub fn style_tag(category: &str) -> &'static str {
        match Self::try_from(category) {
            Ok(Self::TraumaInformed) => "trauma",
            Ok(Self::Research) => "research",
            Ok(Self::Tools) => "tools",
            Ok(Self::Community) => "community",
            Ok(Self::Official) | Err(_) => "official",
        }
    }
}

impl TryFrom<&str> for ResourceCategory {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::all()
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or("unknown resource category")
    }
}

/// Kind of resource, used for the icon and the translated type label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceType {
    /// Courses and workshops.
    Training,
    /// Handbooks and how-tos.
    Guide,
    /// Screening and checklists.
    Assessment,
    /// Practical tools.
    Tool,
    /// Organisations and networks.
    Network,
    /// Articles and papers.
    Article,
    /// Anything else, kept verbatim.
    Other(String),
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        match value {
            "Training" => Self::Training,
            "Guide" => Self::Guide,
            "Assessment" => Self::Assessment,
            "Tool" => Self::Tool,
            "Network" => Self::Network,
            "Article" => Self::Article,
            other => Self::Other(other.to_string()),
        }
    }
}

impl ResourceType {
    /// Emoji shown before the type label.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Training => "🎓",
            Self::Guide => "📖",
            Self::Assessment => "📋",
            Self::Tool => "🛠️",
            Self::Network => "🤝",
            Self::Article | Self::Other(_) => "📄",
        }
    }

    /// Translated badge with its icon; unknown types show their raw name.
    #[must_use]
    pub fn label(&self, translator: Translator) -> String {
        let key = match self {
            Self::Training => "typeTraining",
            Self::Guide => "typeGuide",
            Self::Assessment => "typeAssessment",
            Self::Tool => "typeTool",
            Self::Network => "typeNetwork",
            Self::Article => "typeArticle",
            Self::Other(raw) => return format!("{} {raw}", self.icon()),
        };
        translator.t(key)
    }
}
