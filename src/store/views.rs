use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::Serialize;

use crate::graph::tree;
use crate::models::{Priority, Task, ViewState};

/// Search and tag filters over the flat collection. Tag filtering matches
/// direct tags only: a descendant carrying the tag does not pull its
/// ancestors into view. Known limitation, kept on purpose.
pub fn apply_filters(tasks: &[Task], state: &ViewState) -> Vec<Task> {
    let query = state.search_query.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            let matches_search = query.is_empty()
                || task.title.to_lowercase().contains(&query)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query));
            let matches_tags = state.selected_tags.is_empty()
                || state
                    .selected_tags
                    .iter()
                    .all(|tag| task.tags.iter().any(|t| t == tag));
            matches_search && matches_tags
        })
        .cloned()
        .collect()
}

/// Flatten a filtered collection into display order: depth-first from the
/// surviving top-level tasks, each entry paired with its depth. A task whose
/// ancestor was filtered out is unreachable and stays hidden, in every
/// output mode. The visited set keeps the walk finite over cyclic or
/// duplicate-id data; first occurrence of an id wins, matching single-task
/// reads.
pub fn visible_tree(tasks: &[Task], hide_completed: bool) -> Vec<(&Task, usize)> {
    let mut visible = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for root in tasks.iter().filter(|t| t.parent_id.is_none()) {
        if hide_completed && root.completed {
            continue;
        }
        descend(tasks, root, 0, hide_completed, &mut seen, &mut visible);
    }
    visible
}

fn descend<'a>(
    tasks: &'a [Task],
    task: &'a Task,
    level: usize,
    hide_completed: bool,
    seen: &mut HashSet<&'a str>,
    visible: &mut Vec<(&'a Task, usize)>,
) {
    if !seen.insert(task.id.as_str()) {
        return;
    }
    visible.push((task, level));
    for child in tasks
        .iter()
        .filter(|t| t.parent_id.as_deref() == Some(task.id.as_str()))
    {
        if hide_completed && child.completed {
            continue;
        }
        descend(tasks, child, level + 1, hide_completed, seen, visible);
    }
}

/// Completed-descendant share of a task's subtree, rounded to a whole
/// percent; a leaf task reports 100 or 0 from its own flag.
pub fn completion_percentage(all: &[Task], task: &Task) -> u32 {
    let descendants = tree::collect_descendants(all, &task.id);
    if descendants.is_empty() {
        return if task.completed { 100 } else { 0 };
    }
    let completed = descendants.iter().filter(|t| t.completed).count();
    ((completed as f64 / descendants.len() as f64) * 100.0).round() as u32
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TaskStatistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: f64,
    pub priorities: PriorityCounts,
    pub tag_usage: BTreeMap<String, usize>,
}

pub fn compute_statistics(tasks: &[Task]) -> TaskStatistics {
    let now = Utc::now();
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    let overdue_tasks = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date.is_some_and(|due| due < now))
        .count();

    let mut priorities = PriorityCounts::default();
    let mut tag_usage: BTreeMap<String, usize> = BTreeMap::new();
    for task in tasks {
        match task.priority {
            Some(Priority::High) => priorities.high += 1,
            Some(Priority::Medium) => priorities.medium += 1,
            Some(Priority::Low) => priorities.low += 1,
            None => {}
        }
        for tag in &task.tags {
            *tag_usage.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    TaskStatistics {
        total_tasks,
        completed_tasks,
        overdue_tasks,
        completion_rate: if total_tasks > 0 {
            (completed_tasks as f64 / total_tasks as f64) * 100.0
        } else {
            0.0
        },
        priorities,
        tag_usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(id: &str, title: &str) -> Task {
        let mut t = Task::new(title, Some(Utc::now() + Duration::days(1)));
        t.id = id.to_string();
        t
    }

    #[test]
    fn search_matches_title_and_description() {
        let mut with_desc = task("a", "plain");
        with_desc.description = Some("quarterly REPORT".into());
        let tasks = vec![with_desc, task("b", "Write report"), task("c", "other")];
        let state = ViewState {
            search_query: "report".into(),
            ..Default::default()
        };
        let out = apply_filters(&tasks, &state);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn tag_filter_requires_every_selected_tag_directly() {
        let mut both = task("both", "x");
        both.tags = vec!["work".into(), "urgent".into()];
        let mut one = task("one", "y");
        one.tags = vec!["work".into()];
        let mut parent = task("parent", "z");
        parent.id = "parent".into();
        let mut tagged_child = task("child", "w");
        tagged_child.parent_id = Some("parent".into());
        tagged_child.tags = vec!["work".into(), "urgent".into()];

        let tasks = vec![both, one, parent, tagged_child];
        let state = ViewState {
            selected_tags: vec!["work".into(), "urgent".into()],
            ..Default::default()
        };
        let out = apply_filters(&tasks, &state);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        // The untagged parent is not pulled in by its matching child.
        assert_eq!(ids, vec!["both", "child"]);
    }

    #[test]
    fn hide_completed_prunes_whole_branches() {
        let mut done = task("done", "done");
        done.completed = true;
        let mut child_of_done = task("child", "child");
        child_of_done.parent_id = Some("done".into());
        let tasks = vec![done, child_of_done, task("open", "open")];

        assert_eq!(visible_tree(&tasks, false).len(), 3);
        let visible = visible_tree(&tasks, true);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0.id, "open");
    }

    #[test]
    fn visible_tree_is_depth_first_with_levels() {
        let root = task("root", "root");
        let mut child = task("child", "child");
        child.parent_id = Some("root".into());
        let mut grandchild = task("grand", "grand");
        grandchild.parent_id = Some("child".into());

        let tasks = vec![root, child, grandchild, task("other", "other")];
        let entries: Vec<(&str, usize)> = visible_tree(&tasks, false)
            .into_iter()
            .map(|(t, level)| (t.id.as_str(), level))
            .collect();
        assert_eq!(
            entries,
            vec![("root", 0), ("child", 1), ("grand", 2), ("other", 0)]
        );
    }

    #[test]
    fn subtask_with_filtered_out_parent_stays_hidden() {
        let mut tagged_child = task("child", "child");
        tagged_child.parent_id = Some("parent".into());
        tagged_child.tags = vec!["work".into()];
        let tasks = vec![task("parent", "parent"), tagged_child];

        let state = ViewState {
            selected_tags: vec!["work".into()],
            ..Default::default()
        };
        let filtered = apply_filters(&tasks, &state);
        // The child survives the flat filter but has no surviving ancestor.
        assert_eq!(filtered.len(), 1);
        assert!(visible_tree(&filtered, false).is_empty());
    }

    #[test]
    fn duplicate_ids_display_once_first_occurrence_wins() {
        let tasks = vec![task("dup", "first"), task("dup", "second")];
        let visible = visible_tree(&tasks, false);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0.title, "first");
    }

    #[test]
    fn completion_percentage_over_descendants() {
        let root = task("root", "root");
        let mut done_child = task("c1", "one");
        done_child.parent_id = Some("root".into());
        done_child.completed = true;
        let mut open_child = task("c2", "two");
        open_child.parent_id = Some("root".into());
        let mut open_grandchild = task("g1", "three");
        open_grandchild.parent_id = Some("c1".into());

        let all = vec![root.clone(), done_child, open_child, open_grandchild];
        assert_eq!(completion_percentage(&all, &root), 33);
    }

    #[test]
    fn leaf_percentage_follows_own_flag() {
        let mut leaf = task("leaf", "leaf");
        let all = vec![leaf.clone()];
        assert_eq!(completion_percentage(&all, &leaf), 0);
        leaf.completed = true;
        assert_eq!(completion_percentage(&[leaf.clone()], &leaf), 100);
    }

    #[test]
    fn statistics_counts_everything() {
        let mut done = task("a", "a");
        done.completed = true;
        done.tags = vec!["work".into()];
        let mut overdue = task("b", "b");
        overdue.due_date = Some(Utc::now() - Duration::days(2));
        overdue.priority = Some(Priority::High);
        overdue.tags = vec!["work".into(), "urgent".into()];
        let mut low = task("c", "c");
        low.priority = Some(Priority::Low);

        let stats = compute_statistics(&[done, overdue, low]);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert!((stats.completion_rate - 33.333).abs() < 0.01);
        assert_eq!(stats.priorities.high, 1);
        assert_eq!(stats.priorities.low, 1);
        assert_eq!(stats.tag_usage.get("work"), Some(&2));
        assert_eq!(stats.tag_usage.get("urgent"), Some(&1));
    }

    #[test]
    fn empty_collection_statistics() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }
}
