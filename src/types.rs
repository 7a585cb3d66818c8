use serde::{Deserialize, Serialize};

/// Final or transient state of a single link check.
///
/// `Checking` is only ever observed while a check is in flight; a finished
/// health tree contains `Working`, `Broken` and `Empty` leaves exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Checking,
    Working,
    Broken,
    Empty,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkState::Checking => "checking",
            LinkState::Working => "working",
            LinkState::Broken => "broken",
            LinkState::Empty => "empty",
        };
        write!(f, "{}", s)
    }
}

/// Result of checking one URL or video id. This is also the wire shape of
/// the `/api/validate-link` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckOutcome {
    pub status: LinkState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn empty() -> Self {
        Self { status: LinkState::Empty, code: None, error: None }
    }

    pub fn working(code: u16) -> Self {
        Self { status: LinkState::Working, code: Some(code), error: None }
    }

    pub fn broken_code(code: u16) -> Self {
        Self { status: LinkState::Broken, code: Some(code), error: None }
    }

    pub fn broken_error(message: impl Into<String>) -> Self {
        Self { status: LinkState::Broken, code: None, error: Some(message.into()) }
    }

    /// Drop code and error, keeping only the status. Video checks are
    /// collapsed this way at the dispatch boundary.
    pub fn status_only(&self) -> Self {
        Self { status: self.status, code: None, error: None }
    }
}

/// One checked link slot in the health tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatus {
    pub url: String,
    pub status: LinkState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl LinkStatus {
    pub fn empty() -> Self {
        Self { url: String::new(), status: LinkState::Empty, status_code: None }
    }

    pub fn from_outcome(url: impl Into<String>, outcome: &CheckOutcome) -> Self {
        Self { url: url.into(), status: outcome.status, status_code: outcome.code }
    }
}

/// Health of the four link slots of one lesson day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHealth {
    pub day_number: u32,
    pub topic: String,
    pub quiz_link: LinkStatus,
    pub project_link: LinkStatus,
    pub english_video: LinkStatus,
    pub telugu_video: LinkStatus,
}

impl DayHealth {
    /// The four slots in fixed order: quiz, project, english, telugu.
    pub fn slots(&self) -> [&LinkStatus; 4] {
        [&self.quiz_link, &self.project_link, &self.english_video, &self.telugu_video]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassHealth {
    pub class_name: String,
    pub class_id: i64,
    pub days: Vec<DayHealth>,
    pub total_days: u32,
    pub working_links: u32,
    pub broken_links: u32,
    pub empty_links: u32,
    pub health_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHealth {
    pub section_name: String,
    pub section_id: i64,
    pub classes: Vec<ClassHealth>,
    pub total_links: u32,
    pub working_links: u32,
    pub broken_links: u32,
    pub empty_links: u32,
    pub health_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_links: u32,
    pub working_links: u32,
    pub broken_links: u32,
    pub empty_links: u32,
    pub health_percentage: u32,
}

/// One complete health run: the full section tree plus overall sums.
/// Rebuilt from scratch on every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "overallStats")]
    pub overall: OverallStats,
    pub sections: Vec<SectionHealth>,
}

// --- Content catalog DTOs ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SectionInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayInfo {
    pub id: i64,
    pub day_number: u32,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub quiz_link: Option<String>,
    #[serde(default)]
    pub project_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayContent {
    #[serde(default)]
    pub videos: Vec<VideoInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoInfo {
    pub language: String,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

/// Request body of `POST /api/validate-link`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub link_type: Option<String>,
}
