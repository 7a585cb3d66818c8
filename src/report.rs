//! Report filtering and export
//!
//! Filters the finished health tree by status, slot type and search text,
//! renders a markdown summary, and serializes the full unfiltered snapshot
//! to a dated JSON artifact. Filtering always produces a new tree; the
//! source snapshot is never mutated.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::types::{DayHealth, HealthSnapshot, LinkState, SectionHealth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Working,
    Broken,
    Empty,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "working" => StatusFilter::Working,
            "broken" => StatusFilter::Broken,
            "empty" => StatusFilter::Empty,
            _ => StatusFilter::All,
        }
    }

    fn matches(self, state: LinkState) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Working => state == LinkState::Working,
            StatusFilter::Broken => state == LinkState::Broken,
            StatusFilter::Empty => state == LinkState::Empty,
        }
    }
}

/// Which of a day's four slots the status filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotFilter {
    #[default]
    All,
    Quiz,
    Project,
    English,
    Telugu,
}

impl SlotFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "quiz" => SlotFilter::Quiz,
            "project" => SlotFilter::Project,
            "english" => SlotFilter::English,
            "telugu" => SlotFilter::Telugu,
            _ => SlotFilter::All,
        }
    }

    fn selected<'a>(self, day: &'a DayHealth) -> Vec<&'a crate::types::LinkStatus> {
        match self {
            SlotFilter::All => day.slots().to_vec(),
            SlotFilter::Quiz => vec![&day.quiz_link],
            SlotFilter::Project => vec![&day.project_link],
            SlotFilter::English => vec![&day.english_video],
            SlotFilter::Telugu => vec![&day.telugu_video],
        }
    }
}

/// Filter the tree. Search text gates whole sections (a section matching by
/// its own name or any contained class name keeps all of its classes); the
/// status/type pair then re-walks days, keeping a day when ANY selected slot
/// matches the status. Classes left with no days and sections left with no
/// classes are dropped.
pub fn filter_sections(
    sections: &[SectionHealth],
    status: StatusFilter,
    slot: SlotFilter,
    search: &str,
) -> Vec<SectionHealth> {
    let query = search.trim().to_lowercase();

    let mut filtered: Vec<SectionHealth> = sections
        .iter()
        .filter(|section| {
            if query.is_empty() {
                return true;
            }
            section.section_name.to_lowercase().contains(&query)
                || section.classes.iter().any(|c| c.class_name.to_lowercase().contains(&query))
        })
        .cloned()
        .collect();

    if status == StatusFilter::All && slot == SlotFilter::All {
        return filtered;
    }

    filtered = filtered
        .into_iter()
        .map(|mut section| {
            section.classes = section
                .classes
                .into_iter()
                .map(|mut class| {
                    class.days.retain(|day| {
                        // When no status is requested the type filter alone
                        // keeps every day, matching the dashboard behavior.
                        if status == StatusFilter::All {
                            return true;
                        }
                        slot.selected(day).iter().any(|link| status.matches(link.status))
                    });
                    class
                })
                .filter(|class| !class.days.is_empty())
                .collect();
            section
        })
        .filter(|section| !section.classes.is_empty())
        .collect();

    filtered
}

/// File name of the export artifact for a given day.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("health-report-{}.json", now.format("%Y-%m-%d"))
}

/// Serialize the full snapshot as the downloadable JSON artifact.
pub fn render_json(snapshot: &HealthSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to serialize health report")
}

/// Write the export artifact into `dir`, returning its path.
pub fn write_report(snapshot: &HealthSnapshot, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {:?}", dir))?;
    let path = dir.join(export_file_name(snapshot.generated_at));
    let json = render_json(snapshot)?;
    fs::write(&path, json).with_context(|| format!("Failed to write report to {:?}", path))?;
    Ok(path)
}

/// Render a markdown summary of a snapshot for terminal output.
pub fn render_summary(snapshot: &HealthSnapshot) -> String {
    let mut report = String::from("# Link Health Report\n\n");
    report.push_str(&format!(
        "Generated: {}\n\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    report.push_str("## Overall\n\n");
    report.push_str(&format!("- Total link slots: {}\n", snapshot.overall.total_links));
    report.push_str(&format!("- Working: {}\n", snapshot.overall.working_links));
    report.push_str(&format!("- Broken: {}\n", snapshot.overall.broken_links));
    report.push_str(&format!("- Empty: {}\n", snapshot.overall.empty_links));
    report.push_str(&format!("- Health: {}%\n\n", snapshot.overall.health_percentage));

    report.push_str("## Sections\n\n");
    report.push_str("| Section | Classes | Links | Working | Broken | Empty | Health |\n");
    report.push_str("|---------|---------|-------|---------|--------|-------|--------|\n");
    for section in &snapshot.sections {
        report.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {}% |\n",
            section.section_name,
            section.classes.len(),
            section.total_links,
            section.working_links,
            section.broken_links,
            section.empty_links,
            section.health_percentage
        ));
    }

    // Broken leaves get their own table so they are actionable.
    let mut broken: Vec<(String, String, u32, &crate::types::LinkStatus)> = Vec::new();
    for section in &snapshot.sections {
        for class in &section.classes {
            for day in &class.days {
                for (label, link) in [
                    ("quiz", &day.quiz_link),
                    ("project", &day.project_link),
                    ("english", &day.english_video),
                    ("telugu", &day.telugu_video),
                ] {
                    if link.status == LinkState::Broken {
                        broken.push((
                            format!("{} / {}", section.section_name, class.class_name),
                            label.to_string(),
                            day.day_number,
                            link,
                        ));
                    }
                }
            }
        }
    }

    if !broken.is_empty() {
        report.push_str("\n## Broken Links\n\n");
        report.push_str("| Location | Day | Slot | URL | Code |\n");
        report.push_str("|----------|-----|------|-----|------|\n");
        for (location, label, day_number, link) in &broken {
            let code = link.status_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                location,
                day_number,
                label,
                truncate_url(&link.url, 60),
                code
            ));
        }
    }

    report
}

fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() > max_len {
        format!("{}...", url.chars().take(max_len - 3).collect::<String>())
    } else {
        url.to_string()
    }
}
