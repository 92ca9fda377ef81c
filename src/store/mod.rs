pub mod views;

use rusqlite::Connection;

use crate::ai;
use crate::db::{connection, share_repo, state_repo, task_repo};
use crate::error::TasktreeError;
use crate::graph::tree;
use crate::models::{FileAttachment, SharePayload, Settings, Task, ViewState};

/// The authoritative command/query surface over the durable collection.
/// All mutation funnels through these methods; consumers never reach into
/// the rows directly. Commands are serialized by the single process plus
/// SQLite's writer lock.
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    pub fn open() -> Result<Self, TasktreeError> {
        Ok(Self {
            conn: connection::open_db()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, TasktreeError>,
    ) -> Result<T, TasktreeError> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(&self.conn) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    // ─── commands ──────────────────────────────────────────────────

    /// Append a fully-formed task. Rejects empty titles, duplicate ids,
    /// missing parents, and parent chains that would loop back to the task.
    pub fn add_task(&self, mut task: Task) -> Result<Task, TasktreeError> {
        if task.title.trim().is_empty() {
            return Err(TasktreeError::validation("Task title must not be empty"));
        }
        if task_repo::task_exists(&self.conn, &task.id)? {
            return Err(TasktreeError::duplicate_task_id(&task.id));
        }
        if let Some(parent_id) = task.parent_id.clone() {
            if !task_repo::task_exists(&self.conn, &parent_id)? {
                return Err(TasktreeError::task_not_found(&parent_id));
            }
            let all = task_repo::list_tasks(&self.conn)?;
            if tree::would_create_cycle(&all, &task.id, &parent_id) {
                return Err(TasktreeError::cycle_detected(&task.id));
            }
        }
        task.sort_order = task_repo::max_sort_order(&self.conn)? + 1;
        task_repo::insert_task(&self.conn, &task)?;
        Ok(task)
    }

    /// Whole-record replace of the task matching `task.id`.
    pub fn update_task(&self, task: Task) -> Result<Task, TasktreeError> {
        if task.title.trim().is_empty() {
            return Err(TasktreeError::validation("Task title must not be empty"));
        }
        if let Some(parent_id) = task.parent_id.as_deref() {
            if !task_repo::task_exists(&self.conn, parent_id)? {
                return Err(TasktreeError::task_not_found(parent_id));
            }
            let all = task_repo::list_tasks(&self.conn)?;
            if tree::would_create_cycle(&all, &task.id, parent_id) {
                return Err(TasktreeError::cycle_detected(&task.id));
            }
        }
        task_repo::replace_task(&self.conn, &task)?;
        Ok(task)
    }

    /// Cascade delete: the task plus its full descendant subtree. The
    /// cascade set is computed before any row is touched. Returns the
    /// removed ids, root first.
    pub fn delete_task(&self, id: &str) -> Result<Vec<String>, TasktreeError> {
        let root = task_repo::get_task_by_id(&self.conn, id)?;
        let all = task_repo::list_tasks(&self.conn)?;
        let mut ids: Vec<String> = vec![root.id];
        ids.extend(tree::collect_descendants(&all, id).into_iter().map(|t| t.id));
        self.in_transaction(|conn| task_repo::delete_tasks(conn, &ids))?;
        Ok(ids)
    }

    /// Flips `completed` on exactly the named task; descendants and
    /// ancestors are untouched.
    pub fn toggle_complete(&self, id: &str) -> Result<Task, TasktreeError> {
        let task = task_repo::get_task_by_id(&self.conn, id)?;
        task_repo::set_completed(&self.conn, id, !task.completed)?;
        task_repo::get_task_by_id(&self.conn, id)
    }

    pub fn add_subtask(&self, parent_id: &str, mut subtask: Task) -> Result<Task, TasktreeError> {
        subtask.parent_id = Some(parent_id.to_string());
        self.add_task(subtask)
    }

    /// Expand `title` through the subtask generator and bulk-append the
    /// results under `parent_id`. A generator that produces nothing is not
    /// an error; the caller just gets an empty batch.
    pub fn add_ai_subtasks(
        &self,
        parent_id: &str,
        title: &str,
        depth: usize,
    ) -> Result<Vec<Task>, TasktreeError> {
        if !task_repo::task_exists(&self.conn, parent_id)? {
            return Err(TasktreeError::task_not_found(parent_id));
        }
        let mut generated = ai::generate_subtasks(title, depth);
        let mut next_order = task_repo::max_sort_order(&self.conn)? + 1;
        for task in &mut generated {
            task.parent_id = Some(parent_id.to_string());
            task.sort_order = next_order;
            next_order += 1;
        }
        self.in_transaction(|conn| {
            for task in &generated {
                task_repo::insert_task(conn, task)?;
            }
            Ok(())
        })?;
        Ok(generated)
    }

    /// Enabling runs the prioritization engine over the entire collection
    /// and persists the reordered, labeled result. Disabling clears the
    /// labels; the pre-prioritization ordering is not restored.
    pub fn set_prioritization(&self, enabled: bool) -> Result<(), TasktreeError> {
        let mut state = state_repo::load_view_state(&self.conn)?;
        state.ai_prioritization = enabled;
        self.in_transaction(|conn| {
            if enabled {
                let prioritized = ai::prioritize(task_repo::list_tasks(conn)?);
                for (index, task) in prioritized.iter().enumerate() {
                    task_repo::set_order_and_priority(conn, &task.id, index as i64, task.priority)?;
                }
            } else {
                task_repo::clear_priorities(conn)?;
            }
            state_repo::save_view_state(conn, &state)
        })
    }

    pub fn set_hide_completed(&self, hidden: bool) -> Result<(), TasktreeError> {
        let mut state = state_repo::load_view_state(&self.conn)?;
        state.hide_completed = hidden;
        state_repo::save_view_state(&self.conn, &state)
    }

    pub fn set_selected_tags(&self, tags: Vec<String>) -> Result<(), TasktreeError> {
        let mut state = state_repo::load_view_state(&self.conn)?;
        state.selected_tags = tags;
        state_repo::save_view_state(&self.conn, &state)
    }

    pub fn set_search_query(&self, query: String) -> Result<(), TasktreeError> {
        let mut state = state_repo::load_view_state(&self.conn)?;
        state.search_query = query;
        state_repo::save_view_state(&self.conn, &state)
    }

    /// Verbatim append: no id collision detection, no cycle check.
    /// Importing the same document twice duplicates its tasks.
    pub fn import_tasks(&self, tasks: Vec<Task>) -> Result<usize, TasktreeError> {
        let count = tasks.len();
        let mut next_order = task_repo::max_sort_order(&self.conn)? + 1;
        self.in_transaction(|conn| {
            for mut task in tasks {
                task.sort_order = next_order;
                next_order += 1;
                task_repo::insert_task(conn, &task)?;
            }
            Ok(())
        })?;
        Ok(count)
    }

    pub fn clear_tasks(&self) -> Result<usize, TasktreeError> {
        task_repo::delete_all_tasks(&self.conn)
    }

    pub fn add_tag(&self, id: &str, tag: &str) -> Result<Task, TasktreeError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(TasktreeError::validation("Tag must not be empty"));
        }
        let mut task = task_repo::get_task_by_id(&self.conn, id)?;
        if !task.tags.iter().any(|t| t == tag) {
            task.tags.push(tag.to_string());
            task_repo::replace_task(&self.conn, &task)?;
        }
        Ok(task)
    }

    pub fn remove_tag(&self, id: &str, tag: &str) -> Result<Task, TasktreeError> {
        let mut task = task_repo::get_task_by_id(&self.conn, id)?;
        task.tags.retain(|t| t != tag);
        task_repo::replace_task(&self.conn, &task)?;
        Ok(task)
    }

    pub fn attach_file(&self, id: &str, file: FileAttachment) -> Result<Task, TasktreeError> {
        let mut task = task_repo::get_task_by_id(&self.conn, id)?;
        task.files.push(file);
        task_repo::replace_task(&self.conn, &task)?;
        Ok(task)
    }

    pub fn detach_file(&self, id: &str, name: &str) -> Result<Task, TasktreeError> {
        let mut task = task_repo::get_task_by_id(&self.conn, id)?;
        task.files.retain(|f| f.name != name);
        task_repo::replace_task(&self.conn, &task)?;
        Ok(task)
    }

    // ─── queries ───────────────────────────────────────────────────

    pub fn get_task(&self, id: &str) -> Result<Task, TasktreeError> {
        task_repo::get_task_by_id(&self.conn, id)
    }

    pub fn all_tasks(&self) -> Result<Vec<Task>, TasktreeError> {
        task_repo::list_tasks(&self.conn)
    }

    /// Direct children only (single level).
    pub fn get_subtasks(&self, id: &str) -> Result<Vec<Task>, TasktreeError> {
        task_repo::children_of(&self.conn, id)
    }

    /// Full transitive descendant set, depth-first, parent before children.
    pub fn get_all_subtasks(&self, id: &str) -> Result<Vec<Task>, TasktreeError> {
        let all = task_repo::list_tasks(&self.conn)?;
        Ok(tree::collect_descendants(&all, id))
    }

    pub fn view_state(&self) -> Result<ViewState, TasktreeError> {
        state_repo::load_view_state(&self.conn)
    }

    pub fn settings(&self) -> Result<Settings, TasktreeError> {
        state_repo::load_settings(&self.conn)
    }

    pub fn set_minimalist_mode(&self, enabled: bool) -> Result<(), TasktreeError> {
        let mut settings = state_repo::load_settings(&self.conn)?;
        settings.minimalist_mode = enabled;
        state_repo::save_settings(&self.conn, &settings)
    }

    // ─── share boundary ────────────────────────────────────────────

    /// Snapshot a task and its full subtree into the share store and mark
    /// the root with the returned token.
    pub fn share_task(&self, id: &str) -> Result<(String, usize), TasktreeError> {
        let root = task_repo::get_task_by_id(&self.conn, id)?;
        let subtree = self.get_all_subtasks(id)?;
        let mut tasks = Vec::with_capacity(subtree.len() + 1);
        tasks.push(root.clone());
        tasks.extend(subtree);
        let count = tasks.len();
        let payload = SharePayload {
            tags: if root.tags.is_empty() {
                None
            } else {
                Some(root.tags.clone())
            },
            tasks: Some(tasks),
        };
        let token = share_repo::create_share(&self.conn, &payload)?;
        task_repo::set_share_id(&self.conn, id, &token)?;
        Ok((token, count))
    }

    pub fn get_shared(&self, token: &str) -> Result<Option<SharePayload>, TasktreeError> {
        share_repo::get_share(&self.conn, token)
    }

    pub fn cleanup_shares(&self) -> Result<usize, TasktreeError> {
        share_repo::cleanup_shares(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory;
    use chrono::{Duration, Utc};

    fn store() -> TaskStore {
        TaskStore::from_connection(open_in_memory())
    }

    fn new_task(title: &str) -> Task {
        Task::new(title, Some(Utc::now() + Duration::days(3)))
    }

    #[test]
    fn add_rejects_empty_title() {
        let store = store();
        let err = store.add_task(new_task("   ")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let store = store();
        let task = store.add_task(new_task("one")).unwrap();
        let mut dup = new_task("two");
        dup.id = task.id.clone();
        let err = store.add_task(dup).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DuplicateTaskId);
    }

    #[test]
    fn add_subtask_requires_existing_parent() {
        let store = store();
        let err = store.add_subtask("missing", new_task("child")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TaskNotFound);
    }

    #[test]
    fn reparenting_under_own_descendant_is_rejected() {
        let store = store();
        let a = store.add_task(new_task("a")).unwrap();
        let b = store.add_subtask(&a.id, new_task("b")).unwrap();
        let c = store.add_subtask(&b.id, new_task("c")).unwrap();

        let mut moved = a.clone();
        moved.parent_id = Some(c.id.clone());
        let err = store.update_task(moved).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CycleDetected);
    }

    #[test]
    fn delete_cascades_to_subtree_and_nothing_else() {
        let store = store();
        let root = store.add_task(new_task("root")).unwrap();
        let child = store.add_subtask(&root.id, new_task("child")).unwrap();
        let _grandchild = store.add_subtask(&child.id, new_task("grandchild")).unwrap();
        let other = store.add_task(new_task("other")).unwrap();

        let removed = store.delete_task(&root.id).unwrap();
        assert_eq!(removed.len(), 3);

        let remaining = store.all_tasks().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);
        // No survivor references a deleted parent.
        for task in &remaining {
            assert!(task.parent_id.is_none());
        }
    }

    #[test]
    fn toggle_flips_only_the_named_task() {
        let store = store();
        let root = store.add_task(new_task("root")).unwrap();
        let child = store.add_subtask(&root.id, new_task("child")).unwrap();

        let toggled = store.toggle_complete(&root.id).unwrap();
        assert!(toggled.completed);
        assert!(!store.get_task(&child.id).unwrap().completed);

        let toggled_back = store.toggle_complete(&root.id).unwrap();
        assert!(!toggled_back.completed);
    }

    #[test]
    fn update_replaces_whole_record() {
        let store = store();
        let mut task = store.add_task(new_task("before")).unwrap();
        task.title = "after".into();
        task.description = Some("details".into());
        store.update_task(task.clone()).unwrap();

        let loaded = store.get_task(&task.id).unwrap();
        assert_eq!(loaded.title, "after");
        assert_eq!(loaded.description.as_deref(), Some("details"));
    }

    #[test]
    fn update_of_missing_task_signals_not_found() {
        let store = store();
        let err = store.update_task(new_task("ghost")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TaskNotFound);
    }

    #[test]
    fn ai_subtasks_are_stamped_with_parent() {
        let store = store();
        let parent = store.add_task(new_task("Write an article")).unwrap();
        let batch = store.add_ai_subtasks(&parent.id, &parent.title, 3).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].title, "Create outline");
        for task in &batch {
            assert_eq!(task.parent_id.as_deref(), Some(parent.id.as_str()));
        }
        assert_eq!(store.get_subtasks(&parent.id).unwrap().len(), 3);
    }

    #[test]
    fn get_all_subtasks_parent_before_child() {
        let store = store();
        let root = store.add_task(new_task("root")).unwrap();
        let child = store.add_subtask(&root.id, new_task("child")).unwrap();
        let grandchild = store.add_subtask(&child.id, new_task("grandchild")).unwrap();
        let sibling = store.add_subtask(&root.id, new_task("sibling")).unwrap();

        let ids: Vec<String> = store
            .get_all_subtasks(&root.id)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![child.id, grandchild.id, sibling.id]);
    }

    #[test]
    fn prioritization_reorders_and_labels_then_disable_clears_labels() {
        let store = store();
        let mut done = new_task("done");
        done.completed = true;
        let done = store.add_task(done).unwrap();
        let soon = store
            .add_task(Task::new("soon", Some(Utc::now() + Duration::days(1))))
            .unwrap();
        let late = store
            .add_task(Task::new("late", Some(Utc::now() + Duration::days(30))))
            .unwrap();

        store.set_prioritization(true).unwrap();
        assert!(store.view_state().unwrap().ai_prioritization);
        let ordered = store.all_tasks().unwrap();
        let ids: Vec<&str> = ordered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![soon.id.as_str(), late.id.as_str(), done.id.as_str()]);
        assert!(ordered[0].priority.is_some());
        assert!(ordered[2].priority.is_none());

        store.set_prioritization(false).unwrap();
        assert!(!store.view_state().unwrap().ai_prioritization);
        // Labels cleared, order not restored.
        let after = store.all_tasks().unwrap();
        assert!(after.iter().all(|t| t.priority.is_none()));
        let after_ids: Vec<&str> = after.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(after_ids, ids);
    }

    #[test]
    fn import_appends_verbatim_even_duplicates() {
        let store = store();
        let task = store.add_task(new_task("mine")).unwrap();
        let doc = vec![task.clone(), task.clone()];
        store.import_tasks(doc).unwrap();
        assert_eq!(store.all_tasks().unwrap().len(), 3);
    }

    #[test]
    fn tags_are_deduped_on_add() {
        let store = store();
        let task = store.add_task(new_task("tagged")).unwrap();
        store.add_tag(&task.id, "work").unwrap();
        store.add_tag(&task.id, "work").unwrap();
        store.add_tag(&task.id, "home").unwrap();
        assert_eq!(store.get_task(&task.id).unwrap().tags, vec!["work", "home"]);

        store.remove_tag(&task.id, "work").unwrap();
        assert_eq!(store.get_task(&task.id).unwrap().tags, vec!["home"]);
    }

    #[test]
    fn share_task_snapshots_subtree_and_marks_root() {
        let store = store();
        let root = store.add_task(new_task("root")).unwrap();
        store.add_tag(&root.id, "work").unwrap();
        let child = store.add_subtask(&root.id, new_task("child")).unwrap();

        let (token, count) = store.share_task(&root.id).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.get_task(&root.id).unwrap().share_id, Some(token.clone()));

        let payload = store.get_shared(&token).unwrap().expect("live share");
        let shared = payload.tasks.expect("tasks in payload");
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[1].id, child.id);
        assert_eq!(payload.tags, Some(vec!["work".into()]));
    }

    #[test]
    fn view_state_round_trips() {
        let store = store();
        store.set_hide_completed(true).unwrap();
        store.set_selected_tags(vec!["a".into(), "b".into()]).unwrap();
        store.set_search_query("report".into()).unwrap();

        let state = store.view_state().unwrap();
        assert!(state.hide_completed);
        assert_eq!(state.selected_tags, vec!["a", "b"]);
        assert_eq!(state.search_query, "report");
    }

    #[test]
    fn settings_round_trip() {
        let store = store();
        assert!(!store.settings().unwrap().minimalist_mode);
        store.set_minimalist_mode(true).unwrap();
        assert!(store.settings().unwrap().minimalist_mode);
    }
}
