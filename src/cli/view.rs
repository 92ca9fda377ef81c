use serde_json::json;

use crate::cli::commands::{Toggle, ViewCommands};
use crate::error::TasktreeError;
use crate::output;
use crate::store::TaskStore;

pub fn run(cmd: ViewCommands, json_output: bool) -> i32 {
    let result = match cmd {
        ViewCommands::HideCompleted { state } => run_hide_completed(state, json_output),
        ViewCommands::Tags { tags } => run_tags(tags, json_output),
        ViewCommands::Search { query } => run_search(query, json_output),
        ViewCommands::Show => run_show(json_output),
    };
    report(result, json_output)
}

pub fn run_prioritize(state: Toggle, json_output: bool) -> i32 {
    let result = (|| {
        let store = TaskStore::open()?;
        store.set_prioritization(state.as_bool())?;
        print_state(&store, json_output)
    })();
    report(result, json_output)
}

fn run_hide_completed(state: Toggle, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    store.set_hide_completed(state.as_bool())?;
    print_state(&store, json_output)
}

fn run_tags(tags: Vec<String>, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    store.set_selected_tags(tags)?;
    print_state(&store, json_output)
}

fn run_search(query: Option<String>, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    store.set_search_query(query.unwrap_or_default())?;
    print_state(&store, json_output)
}

fn run_show(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    print_state(&store, json_output)
}

fn print_state(store: &TaskStore, json_output: bool) -> Result<i32, TasktreeError> {
    let state = store.view_state()?;
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "filters": output::json::view_state_json(&state)
            })))
            .unwrap()
        );
    } else {
        output::text::print_view_state(&state);
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
