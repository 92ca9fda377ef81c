use serde_json::json;

use crate::cli::commands::ShareCommands;
use crate::error::TasktreeError;
use crate::output;
use crate::store::TaskStore;

pub fn run(cmd: ShareCommands, json_output: bool) -> i32 {
    let result = match cmd {
        ShareCommands::Create { id } => run_create(&id, json_output),
        ShareCommands::Show { token } => run_show(&token, json_output),
        ShareCommands::Import { token } => run_import(&token, json_output),
        ShareCommands::Cleanup => run_cleanup(json_output),
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

fn run_create(id: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let (token, count) = store.share_task(id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "token": token,
                "path": format!("/share/{token}"),
                "tasks": count
            })))
            .unwrap()
        );
    } else {
        println!("Shared {count} task(s) as /share/{token} (expires in 7 days)");
    }
    Ok(0)
}

/// Absent or expired is "no data", not an error: exit code 2.
fn run_show(token: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    match store.get_shared(token)? {
        Some(payload) => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "share": output::json::share_payload_json(&payload)
                    })))
                    .unwrap()
                );
            } else {
                output::text::print_share_payload(&payload);
            }
            Ok(0)
        }
        None => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({ "share": null })))
                        .unwrap()
                );
            } else {
                println!("No shared data for token: {token}");
            }
            Ok(2)
        }
    }
}

fn run_import(token: &str, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let payload = match store.get_shared(token)? {
        Some(payload) => payload,
        None => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({ "share": null })))
                        .unwrap()
                );
            } else {
                println!("No shared data for token: {token}");
            }
            return Ok(2);
        }
    };
    let tasks = payload.tasks.unwrap_or_default();
    let imported = store.import_tasks(tasks)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "imported": imported })))
                .unwrap()
        );
    } else {
        println!("Imported {imported} task(s) from /share/{token}");
    }
    Ok(0)
}

fn run_cleanup(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let removed = store.cleanup_shares()?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "removed": removed })))
                .unwrap()
        );
    } else {
        println!("Removed {removed} expired share(s)");
    }
    Ok(0)
}
