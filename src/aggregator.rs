//! Health aggregation
//!
//! Walks the whole catalog (sections -> classes -> days), checks every day's
//! four link slots and folds the results into a fresh health tree with
//! percentage scores at day/class/section/overall level. A branch that fails
//! to enumerate contributes nothing; the run itself always completes.

use crate::catalog::Catalog;
use crate::progress::Progress;
use crate::types::{
    ClassHealth, ClassInfo, DayHealth, DayInfo, HealthSnapshot, LinkState, LinkStatus,
    OverallStats, SectionHealth, SectionInfo,
};
use crate::validator::{LinkChecker, LinkKind};
use crate::youtube::canonical_watch_url;

/// Links checked per day: quiz, project, english video, telugu video.
pub const LINKS_PER_DAY: u32 = 4;

/// Canonical section ordering. Unrecognized names sort alphabetically
/// after the known ones.
const SECTION_PRIORITY: &[&str] = &[
    "class1-5",
    "class6-10",
    "class11-12",
    "grad",
    "life-beyond-academics",
    "summer special",
];

fn priority_rank(name: &str) -> Option<usize> {
    let name = name.trim().to_lowercase();
    SECTION_PRIORITY.iter().position(|known| *known == name)
}

/// Sort sections into the fixed priority order.
pub fn sort_sections(sections: &mut [SectionInfo]) {
    sections.sort_by(|a, b| match (priority_rank(&a.name), priority_rank(&b.name)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

/// Rounded percentage of working links; defined as 0 when nothing to count.
pub fn health_percentage(working: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((working as f64 / total as f64) * 100.0).round() as u32
}

/// Run one complete health check and return the finished snapshot.
///
/// The tree is built fresh and owned by this call; nothing is shared with
/// prior runs. Failures below the section level are absorbed per branch.
pub async fn run_health_check<C, L>(catalog: &C, checker: &L, progress: &Progress) -> HealthSnapshot
where
    C: Catalog + ?Sized,
    L: LinkChecker + ?Sized,
{
    progress.reset(1, "Fetching sections...");

    let mut sections = match catalog.list_sections().await {
        Ok(sections) => sections,
        Err(e) => {
            eprintln!("Error fetching sections: {:#}", e);
            progress.complete_one("No sections found");
            return HealthSnapshot {
                generated_at: chrono::Utc::now(),
                overall: OverallStats::default(),
                sections: vec![],
            };
        }
    };
    progress.complete_one("Sections fetched");

    sort_sections(&mut sections);
    progress.schedule_more(sections.len());

    let mut tree: Vec<SectionHealth> = Vec::with_capacity(sections.len());
    for section in &sections {
        progress.set_message(&format!("Processing {}...", section.name));
        tree.push(check_section_health(catalog, checker, progress, section).await);
        progress.complete_one(&format!("Completed section {}", section.name));
    }

    let overall = compute_overall(&tree);
    HealthSnapshot { generated_at: chrono::Utc::now(), overall, sections: tree }
}

async fn check_section_health<C, L>(
    catalog: &C,
    checker: &L,
    progress: &Progress,
    section: &SectionInfo,
) -> SectionHealth
where
    C: Catalog + ?Sized,
    L: LinkChecker + ?Sized,
{
    let mut health = SectionHealth {
        section_name: section.name.clone(),
        section_id: section.id,
        classes: vec![],
        total_links: 0,
        working_links: 0,
        broken_links: 0,
        empty_links: 0,
        health_percentage: 0,
    };

    match catalog.list_classes(section.id).await {
        Ok(classes) => {
            progress.schedule_more(classes.len());
            for class in &classes {
                progress.set_message(&format!("Processing {} - {}...", section.name, class.name));
                let class_health = check_class_health(catalog, checker, progress, class).await;

                health.total_links += class_health.total_days * LINKS_PER_DAY;
                health.working_links += class_health.working_links;
                health.broken_links += class_health.broken_links;
                health.empty_links += class_health.empty_links;
                health.classes.push(class_health);
                progress.complete_one(&format!("Completed {} - {}", section.name, class.name));
            }
        }
        Err(e) => {
            // This section contributes zero classes; the run continues.
            eprintln!("Error processing section {}: {:#}", section.name, e);
        }
    }

    health.health_percentage = health_percentage(health.working_links, health.total_links);
    health
}

async fn check_class_health<C, L>(
    catalog: &C,
    checker: &L,
    progress: &Progress,
    class: &ClassInfo,
) -> ClassHealth
where
    C: Catalog + ?Sized,
    L: LinkChecker + ?Sized,
{
    let mut health = ClassHealth {
        class_name: class.name.clone(),
        class_id: class.id,
        days: vec![],
        total_days: 0,
        working_links: 0,
        broken_links: 0,
        empty_links: 0,
        health_percentage: 0,
    };

    match catalog.list_days(class.id).await {
        Ok(days) => {
            health.total_days = days.len() as u32;
            progress.schedule_more(days.len());

            for day in &days {
                let day_health = check_day_health(catalog, checker, day).await;
                for slot in day_health.slots() {
                    match slot.status {
                        LinkState::Working => health.working_links += 1,
                        LinkState::Broken => health.broken_links += 1,
                        LinkState::Empty => health.empty_links += 1,
                        LinkState::Checking => {}
                    }
                }
                health.days.push(day_health);
                progress.complete_one(&format!("Processed {} - Day {}", class.name, day.day_number));
            }
        }
        Err(e) => {
            eprintln!("Error checking class {}: {:#}", class.name, e);
        }
    }

    health.health_percentage =
        health_percentage(health.working_links, health.total_days * LINKS_PER_DAY);
    health
}

/// Check one day. The four slots run concurrently and are all joined
/// before the day folds into its class totals.
async fn check_day_health<C, L>(catalog: &C, checker: &L, day: &DayInfo) -> DayHealth
where
    C: Catalog + ?Sized,
    L: LinkChecker + ?Sized,
{
    let quiz_url = day.quiz_link.clone().unwrap_or_default();
    let project_url = day.project_link.clone().unwrap_or_default();

    let (quiz_link, project_link, english_video, telugu_video) = tokio::join!(
        check_slot(checker, quiz_url),
        check_slot(checker, project_url),
        check_video_slot(catalog, checker, day.id, "english"),
        check_video_slot(catalog, checker, day.id, "telugu"),
    );

    DayHealth {
        day_number: day.day_number,
        topic: day
            .topic
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Day {}", day.day_number)),
        quiz_link,
        project_link,
        english_video,
        telugu_video,
    }
}

async fn check_slot<L>(checker: &L, url: String) -> LinkStatus
where
    L: LinkChecker + ?Sized,
{
    if url.trim().is_empty() {
        return LinkStatus::empty();
    }
    let outcome = checker.check(&url, LinkKind::General).await;
    LinkStatus::from_outcome(url, &outcome)
}

/// Resolve a day's stored video id for `language` and validate it. A day
/// without a stored id, or whose content lookup fails, is an empty slot.
async fn check_video_slot<C, L>(catalog: &C, checker: &L, day_id: i64, language: &str) -> LinkStatus
where
    C: Catalog + ?Sized,
    L: LinkChecker + ?Sized,
{
    let content = match catalog.day_content(day_id).await {
        Ok(content) => content,
        Err(_) => return LinkStatus::empty(),
    };

    let video_id = content
        .videos
        .iter()
        .find(|v| v.language == language)
        .and_then(|v| v.youtube_id.as_deref())
        .map(str::trim)
        .unwrap_or("");

    if video_id.is_empty() {
        return LinkStatus::empty();
    }

    let outcome = checker.check(video_id, LinkKind::YouTube).await;
    LinkStatus::from_outcome(canonical_watch_url(video_id), &outcome)
}

/// Sum section counts into overall stats.
pub fn compute_overall(sections: &[SectionHealth]) -> OverallStats {
    let mut overall = OverallStats::default();
    for section in sections {
        overall.total_links += section.total_links;
        overall.working_links += section.working_links;
        overall.broken_links += section.broken_links;
        overall.empty_links += section.empty_links;
    }
    overall.health_percentage = health_percentage(overall.working_links, overall.total_links);
    overall
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<SectionInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| SectionInfo { id: i as i64, name: name.to_string() })
            .collect()
    }

    #[test]
    fn test_sections_sort_in_priority_order() {
        let mut sections = named(&["summer special", "grad", "class1-5", "class6-10"]);
        sort_sections(&mut sections);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["class1-5", "class6-10", "grad", "summer special"]);
    }

    #[test]
    fn test_unknown_sections_sort_alphabetically_after_known() {
        let mut sections = named(&["zeta", "grad", "alpha", "class1-5"]);
        sort_sections(&mut sections);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["class1-5", "grad", "alpha", "zeta"]);
    }

    #[test]
    fn test_health_percentage_rounds_and_handles_zero() {
        assert_eq!(health_percentage(0, 0), 0);
        assert_eq!(health_percentage(1, 3), 33);
        assert_eq!(health_percentage(2, 3), 67);
        assert_eq!(health_percentage(4, 4), 100);
    }

    #[test]
    fn test_compute_overall_sums_sections() {
        let section = |working, broken, empty| SectionHealth {
            section_name: "s".to_string(),
            section_id: 0,
            classes: vec![],
            total_links: working + broken + empty,
            working_links: working,
            broken_links: broken,
            empty_links: empty,
            health_percentage: 0,
        };
        let overall = compute_overall(&[section(3, 1, 0), section(1, 1, 2)]);
        assert_eq!(overall.total_links, 8);
        assert_eq!(overall.working_links, 4);
        assert_eq!(overall.broken_links, 2);
        assert_eq!(overall.empty_links, 2);
        assert_eq!(overall.health_percentage, 50);
    }
}
