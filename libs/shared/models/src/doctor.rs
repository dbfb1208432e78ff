use serde::{Deserialize, Serialize};

/// A doctor as returned by the clinic backend. Read-only from the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    #[serde(default, alias = "years_experience")]
    pub experience: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Doctor {
    /// Label used by the doctor select control.
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.name, self.specialty)
    }
}

/// Filters for the doctor listing. Both absent means every doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorQuery {
    pub search: Option<String>,
    pub specialty: Option<String>,
}

impl DoctorQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    /// Non-empty filters as `(name, value)` pairs, in wire order.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        [("search", self.search.as_deref()), ("specialty", self.specialty.as_deref())]
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name, v))
            })
            .collect()
    }
}
