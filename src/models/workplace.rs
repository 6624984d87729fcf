use serde::Serialize;

/// A job site that time entries are attributed to (⇔ `workplaces` row).
#[derive(Debug, Clone, Serialize)]
pub struct Workplace {
    pub id: i64,
    pub name: String,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub site_number: Option<String>,
    pub project_number: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl Workplace {
    /// Site id as it appears on time intervals.
    pub fn site_key(&self) -> String {
        self.id.to_string()
    }

    /// `site number • address`, skipping blanks.
    pub fn site_line(&self) -> String {
        [self.site_number.as_deref(), self.address.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// Fields accepted when creating or editing a workplace.
#[derive(Debug, Clone, Default)]
pub struct WorkplaceDraft {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub site_number: Option<String>,
    pub project_number: Option<String>,
}
