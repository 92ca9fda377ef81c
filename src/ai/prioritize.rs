use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Priority, Task};

/// Reorder and label a collection by urgency and structure. Pure: never
/// drops or duplicates a task, and an empty input comes back empty.
///
/// Ordering (stable): completed tasks after all incomplete ones; among
/// incomplete tasks, one with at least one subtask sorts before one without,
/// overriding due-date order; remaining ties break by ascending due date
/// (undated tasks after dated peers).
///
/// Labeling, by position in the sorted sequence: completed tasks get no
/// label. The thirds thresholds divide by the full array length, completed
/// tail included, which skews the bands when many tasks are done.
pub fn prioritize(tasks: Vec<Task>) -> Vec<Task> {
    let parent_ids: HashSet<String> = tasks
        .iter()
        .filter_map(|t| t.parent_id.clone())
        .collect();

    let mut sorted = tasks;
    sorted.sort_by(|a, b| {
        match (a.completed, b.completed) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let a_has_subtasks = parent_ids.contains(&a.id);
        let b_has_subtasks = parent_ids.contains(&b.id);
        match (a_has_subtasks, b_has_subtasks) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match (&a.due_date, &b.due_date) {
            (Some(a_due), Some(b_due)) => a_due.cmp(b_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });

    let len = sorted.len();
    for (index, task) in sorted.iter_mut().enumerate() {
        if task.completed {
            task.priority = None;
            continue;
        }
        let position = index as f64 / len as f64;
        task.priority = Some(if position < 0.33 {
            Priority::High
        } else if position < 0.66 {
            Priority::Medium
        } else {
            Priority::Low
        });
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(id: &str, due_in_days: i64, completed: bool) -> Task {
        let mut t = Task::new(format!("task {id}"), Some(Utc::now() + Duration::days(due_in_days)));
        t.id = id.to_string();
        t.completed = completed;
        t
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(prioritize(Vec::new()).is_empty());
    }

    #[test]
    fn never_drops_or_duplicates() {
        let tasks = vec![task("a", 3, false), task("b", 1, true), task("c", 2, false)];
        let out = prioritize(tasks);
        assert_eq!(out.len(), 3);
        let mut seen: Vec<&str> = ids(&out);
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn completed_sort_last_and_lose_their_label() {
        let mut done = task("done", 1, true);
        done.priority = Some(Priority::High);
        let tasks = vec![done, task("open", 5, false)];
        let out = prioritize(tasks);
        assert_eq!(ids(&out), vec!["open", "done"]);
        assert_eq!(out[1].priority, None);
    }

    #[test]
    fn subtask_parents_override_due_date_order() {
        let parent = task("parent", 10, false);
        let mut child = task("child", 1, false);
        child.parent_id = Some("parent".into());
        let urgent = task("urgent", 1, false);
        let out = prioritize(vec![urgent, parent, child]);
        assert_eq!(ids(&out)[0], "parent");
    }

    #[test]
    fn incomplete_tasks_are_due_date_ascending() {
        let out = prioritize(vec![task("late", 9, false), task("soon", 1, false), task("mid", 5, false)]);
        assert_eq!(ids(&out), vec!["soon", "mid", "late"]);
    }

    #[test]
    fn labels_split_into_thirds() {
        let tasks: Vec<Task> = (0..6).map(|i| task(&format!("t{i}"), i, false)).collect();
        let out = prioritize(tasks);
        let labels: Vec<Option<Priority>> = out.iter().map(|t| t.priority).collect();
        assert_eq!(
            labels,
            vec![
                Some(Priority::High),
                Some(Priority::High),
                Some(Priority::Medium),
                Some(Priority::Medium),
                Some(Priority::Low),
                Some(Priority::Low),
            ]
        );
    }

    #[test]
    fn rerun_is_stable_on_incomplete_distinct_due_dates() {
        let tasks = vec![task("a", 1, false), task("b", 2, false), task("c", 3, false)];
        let once = prioritize(tasks);
        let twice = prioritize(once.clone());
        assert_eq!(ids(&once), ids(&twice));
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.priority, b.priority);
        }
    }
}
