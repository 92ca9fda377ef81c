use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::json;

use crate::cli::commands::{TagCommands, TaskCommands};
use crate::error::TasktreeError;
use crate::models::{FileAttachment, Task};
use crate::output;
use crate::store::views;
use crate::store::TaskStore;

pub fn run(cmd: TaskCommands, json_output: bool) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            title,
            due,
            description,
            parent,
            tags,
        } => run_add(&title, &due, description, parent.as_deref(), tags, json_output),
        TaskCommands::List => run_list(json_output),
        TaskCommands::Show { id } => run_show(&id, json_output),
        TaskCommands::Update {
            id,
            title,
            description,
            due,
            parent,
        } => run_update(&id, title, description, due.as_deref(), parent, json_output),
        TaskCommands::Toggle { id } => run_toggle(&id, json_output),
        TaskCommands::Delete { id } => run_delete(&id, json_output),
        TaskCommands::Subtasks { id, all } => run_subtasks(&id, all, json_output),
        TaskCommands::Suggest { id, depth, title } => {
            run_suggest(&id, depth as usize, title.as_deref(), json_output)
        }
        TaskCommands::Tag(tag_cmd) => run_tag(tag_cmd, json_output),
        TaskCommands::Attach { id, path } => run_attach(&id, &path, json_output),
        TaskCommands::Detach { id, name } => run_detach(&id, &name, json_output),
        TaskCommands::Clear => run_clear(json_output),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::error(&e)).unwrap()
                );
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}

pub fn parse_due(s: &str) -> Result<DateTime<Utc>, TasktreeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(TasktreeError::validation(format!(
        "Invalid date '{s}' (expected YYYY-MM-DD or RFC 3339)"
    )))
}

fn run_add(
    title: &str,
    due: &str,
    description: Option<String>,
    parent: Option<&str>,
    tags: Vec<String>,
    json_output: bool,
) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let mut task = Task::new(title, Some(parse_due(due)?));
    task.description = description;
    // The model does not enforce tag uniqueness; dedupe here.
    let mut seen = HashSet::new();
    task.tags = tags
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect();

    let task = match parent {
        Some(parent_id) => store.add_subtask(parent_id, task)?,
        None => store.add_task(task)?,
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task)
            })))
            .unwrap()
        );
    } else {
        println!("Added task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

fn run_list(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let state = store.view_state()?;
    let all = store.all_tasks()?;
    let filtered = views::apply_filters(&all, &state);
    // Both output modes show the same set: tasks reachable from a surviving
    // top-level ancestor. A matching subtask whose parent was filtered out
    // stays hidden.
    let visible = views::visible_tree(&filtered, state.hide_completed);

    if json_output {
        let tasks: Vec<_> = visible
            .iter()
            .map(|&(task, _)| output::json::task_summary(task))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "tasks": tasks,
                "filters": output::json::view_state_json(&state)
            })))
            .unwrap()
        );
    } else if visible.is_empty() {
        let filters_active = state.hide_completed
            || !state.selected_tags.is_empty()
            || !state.search_query.is_empty();
        output::text::print_empty_list(filters_active && !all.is_empty());
    } else {
        for &(task, level) in &visible {
            output::text::print_task_line(task, level);
        }
    }
    Ok(0)
}

fn run_show(id: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let task = store.get_task(id)?;
    let all = store.all_tasks()?;
    let completion = views::completion_percentage(&all, &task);
    let children = store.get_subtasks(id)?;

    if json_output {
        let children_json: Vec<_> = children.iter().map(output::json::task_summary).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_detail(&task, completion),
                "subtasks": children_json
            })))
            .unwrap()
        );
    } else {
        output::text::print_task(&task, completion);
        if !children.is_empty() {
            println!("  Subtasks:");
            for child in &children {
                output::text::print_task_line(child, 1);
            }
        }
    }
    Ok(0)
}

fn run_update(
    id: &str,
    title: Option<String>,
    description: Option<String>,
    due: Option<&str>,
    parent: Option<String>,
    json_output: bool,
) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let mut task = store.get_task(id)?;
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = description {
        task.description = Some(description);
    }
    if let Some(due) = due {
        task.due_date = Some(parse_due(due)?);
    }
    if let Some(parent) = parent {
        task.parent_id = Some(parent);
    }
    let task = store.update_task(task)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task)
            })))
            .unwrap()
        );
    } else {
        println!("Updated task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

fn run_toggle(id: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let task = store.toggle_complete(id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task)
            })))
            .unwrap()
        );
    } else {
        let state = if task.completed { "completed" } else { "reopened" };
        println!("Task {state}: {} ({})", task.title, task.id);
    }
    Ok(0)
}

fn run_delete(id: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let removed = store.delete_task(id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "deleted": removed,
                "count": removed.len()
            })))
            .unwrap()
        );
    } else {
        println!("Deleted {} task(s)", removed.len());
    }
    Ok(0)
}

fn run_subtasks(id: &str, all: bool, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    // Existence check first so a leaf is distinguishable from a bad id.
    store.get_task(id)?;
    let subtasks = if all {
        store.get_all_subtasks(id)?
    } else {
        store.get_subtasks(id)?
    };

    if json_output {
        let subtasks_json: Vec<_> = subtasks.iter().map(output::json::task_summary).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "subtasks": subtasks_json
            })))
            .unwrap()
        );
    } else if subtasks.is_empty() {
        println!("No subtasks.");
    } else {
        for task in &subtasks {
            output::text::print_task_line(task, 0);
        }
    }
    Ok(0)
}

fn run_suggest(
    id: &str,
    depth: usize,
    title_override: Option<&str>,
    json_output: bool,
) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let parent = store.get_task(id)?;
    let title = title_override.unwrap_or(&parent.title);
    let generated = store.add_ai_subtasks(id, title, depth)?;

    if json_output {
        let generated_json: Vec<_> = generated.iter().map(output::json::task_summary).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "subtasks": generated_json
            })))
            .unwrap()
        );
    } else if generated.is_empty() {
        println!("No subtasks generated.");
    } else {
        println!("Generated {} subtask(s) under {}:", generated.len(), parent.title);
        for task in &generated {
            output::text::print_task_line(task, 1);
        }
    }
    Ok(0)
}

fn run_tag(cmd: TagCommands, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let (task, verb) = match cmd {
        TagCommands::Add { id, tag } => (store.add_tag(&id, &tag)?, "Tagged"),
        TagCommands::Remove { id, tag } => (store.remove_tag(&id, &tag)?, "Untagged"),
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": { "id": task.id, "tags": task.tags }
            })))
            .unwrap()
        );
    } else {
        let tags = if task.tags.is_empty() {
            "(none)".to_string()
        } else {
            task.tags.join(", ")
        };
        println!("{verb} {}: {tags}", task.title);
    }
    Ok(0)
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") | Some("md") => "text/plain",
        Some("html") => "text/html",
        Some("csv") => "text/csv",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn run_attach(id: &str, path: &Path, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let meta = fs::metadata(path)
        .map_err(|e| TasktreeError::validation(format!("Cannot read {}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(TasktreeError::validation(format!(
            "Not a file: {}",
            path.display()
        )));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TasktreeError::validation("Attachment path has no file name"))?;
    let locator = fs::canonicalize(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string_lossy().into_owned());

    let file = FileAttachment {
        name: name.clone(),
        size: meta.len(),
        mime_type: mime_type_for(path).to_string(),
        locator,
    };
    let task = store.attach_file(id, file)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": { "id": task.id, "files": task.files }
            })))
            .unwrap()
        );
    } else {
        println!("Attached {name} to {}", task.title);
    }
    Ok(0)
}

fn run_detach(id: &str, name: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let task = store.detach_file(id, name)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": { "id": task.id, "files": task.files }
            })))
            .unwrap()
        );
    } else {
        println!("Detached {name} from {}", task.title);
    }
    Ok(0)
}

fn run_clear(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let removed = store.clear_tasks()?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "deleted": removed })))
                .unwrap()
        );
    } else {
        println!("Deleted {removed} task(s)");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_due_accepts_plain_dates_and_rfc3339() {
        let date = parse_due("2026-09-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-09-15T00:00:00+00:00");

        let precise = parse_due("2026-09-15T08:30:00+02:00").unwrap();
        assert_eq!(precise.to_rfc3339(), "2026-09-15T06:30:00+00:00");

        assert!(parse_due("next tuesday").is_err());
    }

    #[test]
    fn mime_guess_falls_back_to_octet_stream() {
        assert_eq!(mime_type_for(Path::new("notes.md")), "text/plain");
        assert_eq!(mime_type_for(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("blob")), "application/octet-stream");
    }
}
