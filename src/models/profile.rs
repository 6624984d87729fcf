use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    UnderReview,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::UnderReview => "under_review",
            ProfileStatus::Approved => "approved",
            ProfileStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "under_review" | "pending" => Ok(ProfileStatus::UnderReview),
            "approved" => Ok(ProfileStatus::Approved),
            "rejected" => Ok(ProfileStatus::Rejected),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

/// A worker profile (⇔ `profiles` row).
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: ProfileStatus,
    pub team_title: Option<String>,
    pub phone_country: Option<String>,
    pub phone_number: Option<String>,
    pub bank_reg_no: Option<String>,
    pub bank_account_no: Option<String>,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile columns `worker edit` may change. Status and email are managed elsewhere.
pub const EDITABLE_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "team_title",
    "phone_country",
    "phone_number",
    "bank_reg_no",
    "bank_account_no",
    "swift",
    "iban",
    "address",
    "city",
    "postal_code",
];

/// Parse `key=value`. The key must be in `EDITABLE_FIELDS`;
/// a blank value becomes `None` (clears the column).
pub fn parse_field_update(s: &str) -> AppResult<(&'static str, Option<String>)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| AppError::Validation(format!("expected KEY=VALUE, got '{s}'")))?;

    let key = key.trim().to_ascii_lowercase();
    let field = EDITABLE_FIELDS
        .iter()
        .copied()
        .find(|f| *f == key)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "field '{key}' cannot be edited (allowed: {})",
                EDITABLE_FIELDS.join(", ")
            ))
        })?;

    let value = value.trim();
    Ok((field, (!value.is_empty()).then(|| value.to_string())))
}

impl Profile {
    /// "First Last", or the user id when both names are blank.
    pub fn display_name(&self) -> String {
        display_name(
            &self.user_id,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

pub fn display_name(user_id: &str, first: Option<&str>, last: Option<&str>) -> String {
    let full = format!("{} {}", first.unwrap_or("").trim(), last.unwrap_or("").trim());
    let full = full.trim();
    if full.is_empty() {
        user_id.to_string()
    } else {
        full.to_string()
    }
}
