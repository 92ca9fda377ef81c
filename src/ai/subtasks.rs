use chrono::{Duration, Utc};

use crate::models::Task;

const DEFAULT_TEMPLATE: [&str; 5] = [
    "Research and gather information",
    "Create initial draft",
    "Review and revise",
    "Get feedback",
    "Finalize and complete",
];

const PROJECT_TEMPLATE: [&str; 5] = [
    "Define project scope and objectives",
    "Create project timeline",
    "Assign team responsibilities",
    "Set up project infrastructure",
    "Schedule kickoff meeting",
];

const WRITING_TEMPLATE: [&str; 5] = [
    "Create outline",
    "Write first draft",
    "Edit and revise",
    "Get peer review",
    "Final proofreading",
];

const DEVELOPMENT_TEMPLATE: [&str; 5] = [
    "Setup development environment",
    "Implement core functionality",
    "Write tests",
    "Code review",
    "Deploy and test",
];

fn select_template(title: &str) -> &'static [&'static str; 5] {
    let lower = title.to_lowercase();
    if lower.contains("project") {
        &PROJECT_TEMPLATE
    } else if lower.contains("write") || lower.contains("article") {
        &WRITING_TEMPLATE
    } else if lower.contains("develop") || lower.contains("code") {
        &DEVELOPMENT_TEMPLATE
    } else {
        &DEFAULT_TEMPLATE
    }
}

/// Deterministically expand a task title into template-derived subtasks.
/// Simulated assistance, not inference: the template is picked by substring
/// match on the title and truncated to `depth` entries (so a depth beyond
/// the template length clamps to the template, not the request). Each
/// subtask is due `position + 1` days out. The caller stamps `parent_id`.
pub fn generate_subtasks(title: &str, depth: usize) -> Vec<Task> {
    let now = Utc::now();
    select_template(title)
        .iter()
        .take(depth)
        .enumerate()
        .map(|(index, subtask_title)| {
            Task::new(
                *subtask_title,
                Some(now + Duration::days(index as i64 + 1)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn writing_template_selected_by_substring() {
        let subtasks = generate_subtasks("Write an article about birds", 3);
        let titles: Vec<&str> = subtasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Create outline", "Write first draft", "Edit and revise"]);
    }

    #[test]
    fn template_match_is_case_insensitive() {
        let subtasks = generate_subtasks("PROJECT kickoff", 1);
        assert_eq!(subtasks[0].title, "Define project scope and objectives");
    }

    #[test]
    fn unmatched_title_uses_default_template() {
        let subtasks = generate_subtasks("Random task", 2);
        assert_eq!(subtasks[0].title, "Research and gather information");
        assert_eq!(subtasks[1].title, "Create initial draft");
    }

    #[test]
    fn depth_clamped_by_template_length() {
        assert_eq!(generate_subtasks("Random task", 10).len(), 5);
    }

    #[test]
    fn due_dates_spread_across_days() {
        let before = Utc::now();
        let subtasks = generate_subtasks("Develop the parser", 3);
        for (index, task) in subtasks.iter().enumerate() {
            let due = task.due_date.expect("generated subtasks are dated");
            let offset = Duration::days(index as i64 + 1);
            assert!(due >= before + offset);
            assert!(due <= Utc::now() + offset);
            assert!(!task.completed);
            assert!(task.parent_id.is_none());
        }
    }

    #[test]
    fn each_generated_task_has_a_fresh_id() {
        let subtasks = generate_subtasks("Random task", 5);
        let mut ids: Vec<&str> = subtasks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
