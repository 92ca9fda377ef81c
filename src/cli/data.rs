use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;

use crate::error::TasktreeError;
use crate::models::Task;
use crate::output;
use crate::store::TaskStore;

/// Export writes the plain task-list document (not the success envelope) so
/// stdout pipes straight back into `import`.
pub fn run_export(output_path: Option<&Path>, json_output: bool) -> i32 {
    let result = run_export_inner(output_path, json_output);
    report(result, json_output)
}

pub fn run_import(file: Option<&Path>, json_output: bool) -> i32 {
    let result = run_import_inner(file, json_output);
    report(result, json_output)
}

fn run_export_inner(output_path: Option<&Path>, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let tasks = store.all_tasks()?;
    let document = serde_json::to_string_pretty(&tasks)
        .map_err(|e| TasktreeError::database(e.to_string()))?;

    match output_path {
        Some(path) => {
            let path = resolve_export_path(path);
            fs::write(&path, document)
                .map_err(|e| TasktreeError::database(format!("Cannot write {}: {e}", path.display())))?;
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "exported": tasks.len(),
                        "path": path.to_string_lossy()
                    })))
                    .unwrap()
                );
            } else {
                println!("Exported {} task(s) to {}", tasks.len(), path.display());
            }
        }
        None => println!("{document}"),
    }
    Ok(0)
}

/// A bare directory gets the timestamped backup name inside it.
fn resolve_export_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        path.join(format!("tasktree-backup-{stamp}.json"))
    } else {
        path.to_path_buf()
    }
}

fn run_import_inner(file: Option<&Path>, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| TasktreeError::validation(format!("Cannot read {}: {e}", path.display())))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| TasktreeError::validation(format!("Cannot read stdin: {e}")))?;
            buf
        }
    };
    let tasks: Vec<Task> = serde_json::from_str(&content)
        .map_err(|e| TasktreeError::validation(format!("Invalid export document: {e}")))?;
    let imported = store.import_tasks(tasks)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "imported": imported })))
                .unwrap()
        );
    } else {
        println!("Imported {imported} task(s)");
    }
    Ok(0)
}

fn report(result: Result<i32, TasktreeError>, json_output: bool) -> i32 {
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
