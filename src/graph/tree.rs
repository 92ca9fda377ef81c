use std::collections::{HashMap, HashSet};

use crate::models::Task;

/// Collect the full transitive descendant set of `root_id`, depth-first,
/// parent before children. A visited set guarantees each task appears once
/// and that the walk terminates even over cyclic or duplicate-id data.
pub fn collect_descendants(tasks: &[Task], root_id: &str) -> Vec<Task> {
    let mut children: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            children.entry(parent).or_default().push(task);
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root_id);
    let mut result = Vec::new();
    let mut stack: Vec<&Task> = Vec::new();

    if let Some(direct) = children.get(root_id) {
        for child in direct.iter().rev() {
            stack.push(child);
        }
    }
    while let Some(task) = stack.pop() {
        if !visited.insert(task.id.as_str()) {
            continue;
        }
        result.push(task.clone());
        if let Some(grandchildren) = children.get(task.id.as_str()) {
            for child in grandchildren.iter().rev() {
                stack.push(child);
            }
        }
    }
    result
}

/// Check whether parenting `task_id` under `parent_id` would make the task
/// its own ancestor. Walks the parent chain upward from `parent_id`; the
/// visited set keeps the walk finite over already-corrupt data.
pub fn would_create_cycle(tasks: &[Task], task_id: &str, parent_id: &str) -> bool {
    if task_id == parent_id {
        return true;
    }
    let parents: HashMap<&str, Option<&str>> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.parent_id.as_deref()))
        .collect();

    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = Some(parent_id);
    while let Some(id) = current {
        if id == task_id {
            return true;
        }
        if !visited.insert(id) {
            // Existing cycle above the insertion point; refuse to extend it.
            return true;
        }
        current = parents.get(id).copied().flatten();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, parent: Option<&str>) -> Task {
        let mut t = Task::new(format!("task {id}"), None);
        t.id = id.to_string();
        t.parent_id = parent.map(String::from);
        t
    }

    #[test]
    fn descendants_parent_before_children() {
        let tasks = vec![
            task("a", None),
            task("b", Some("a")),
            task("c", Some("b")),
            task("d", Some("a")),
            task("e", None),
        ];
        let ids: Vec<String> = collect_descendants(&tasks, "a")
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn descendants_of_leaf_is_empty() {
        let tasks = vec![task("a", None), task("b", Some("a"))];
        assert!(collect_descendants(&tasks, "b").is_empty());
    }

    #[test]
    fn descendants_terminates_on_cycle() {
        let tasks = vec![task("a", Some("b")), task("b", Some("a"))];
        let ids: Vec<String> = collect_descendants(&tasks, "a")
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn each_descendant_exactly_once_with_duplicate_ids() {
        let tasks = vec![
            task("a", None),
            task("b", Some("a")),
            task("b", Some("a")),
        ];
        assert_eq!(collect_descendants(&tasks, "a").len(), 1);
    }

    #[test]
    fn no_cycle_for_fresh_parent() {
        let tasks = vec![task("a", None), task("b", Some("a"))];
        assert!(!would_create_cycle(&tasks, "c", "b"));
    }

    #[test]
    fn self_parent_is_cycle() {
        let tasks = vec![task("a", None)];
        assert!(would_create_cycle(&tasks, "a", "a"));
    }

    #[test]
    fn reparenting_under_descendant_is_cycle() {
        let tasks = vec![task("a", None), task("b", Some("a")), task("c", Some("b"))];
        assert!(would_create_cycle(&tasks, "a", "c"));
    }
}
