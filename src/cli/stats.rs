use serde_json::json;

use crate::error::TasktreeError;
use crate::output;
use crate::store::views;
use crate::store::TaskStore;

pub fn run(json_output: bool) -> i32 {
    let result = run_inner(json_output);
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

fn run_inner(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    let tasks = store.all_tasks()?;
    let stats = views::compute_statistics(&tasks);

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "stats": output::json::stats_json(&stats)
            })))
            .unwrap()
        );
    } else {
        output::text::print_stats(&stats);
    }
    Ok(0)
}
