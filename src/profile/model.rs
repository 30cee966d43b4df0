//! Profile and account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display language chosen at sign-up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    #[default]
    En,
    Fr,
    Es,
}

impl Language {
    /// Parse a language code, case-insensitively. Unknown or missing codes fall back to English.
    pub fn parse(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
            Some("de") => Self::De,
            Some("fr") => Self::Fr,
            Some("es") => Self::Es,
            _ => Self::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
            Self::Es => "es",
        };
        write!(f, "{s}")
    }
}

/// Preferred display currency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Gbp,
    Usd,
    Aud,
    Cad,
    Nzd,
}

impl Currency {
    /// Parse a currency code, case-insensitively. Unknown or missing codes fall back to EUR.
    pub fn parse(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
            Some("GBP") => Self::Gbp,
            Some("USD") => Self::Usd,
            Some("AUD") => Self::Aud,
            Some("CAD") => Self::Cad,
            Some("NZD") => Self::Nzd,
            _ => Self::Eur,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Usd => "USD",
            Self::Aud => "AUD",
            Self::Cad => "CAD",
            Self::Nzd => "NZD",
        };
        write!(f, "{s}")
    }
}

/// Profile fields entered at sign-up that could not be attached to the account yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl PendingProfileFields {
    /// Whether at least one field carries a value worth sending.
    ///
    /// Empty strings count as absent.
    pub fn has_content(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.first_name)
            || filled(&self.last_name)
            || self.language.is_some()
            || self.currency.is_some()
    }

    /// Convert into the backend patch payload.
    pub fn to_patch(&self) -> AccountPatch {
        AccountPatch {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            language: self.language,
            currency: self.currency,
        }
    }
}

/// True if `fields` is present and has content.
pub fn has_pending_content(fields: Option<&PendingProfileFields>) -> bool {
    fields.is_some_and(PendingProfileFields::has_content)
}

/// Body of `PATCH /api/v1/me/account`. Absent fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language: Option<Language>,
    pub currency: Option<Currency>,
}

/// Account record as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountDto {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Normalized account record, as written to the account cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<UserAccountDto> for UserAccount {
    fn from(dto: UserAccountDto) -> Self {
        Self {
            user_id: dto.user_id,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            language: dto.language.as_deref().map(|l| Language::parse(Some(l))),
            currency: dto.currency.as_deref().map(|c| Currency::parse(Some(c))),
            created: dto.created,
            updated: dto.updated,
        }
    }
}
