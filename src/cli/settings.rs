use serde_json::json;

use crate::cli::commands::SettingsCommands;
use crate::error::TasktreeError;
use crate::output;
use crate::store::TaskStore;

pub fn run(cmd: SettingsCommands, json_output: bool) -> i32 {
    let result = match cmd {
        SettingsCommands::Minimalist { state } => run_minimalist(state.as_bool(), json_output),
        SettingsCommands::Show => run_show(json_output),
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

fn run_minimalist(enabled: bool, json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    store.set_minimalist_mode(enabled)?;
    run_show_with(&store, json_output)
}

fn run_show(json_output: bool) -> Result<i32, TasktreeError> {
    let store = TaskStore::open()?;
    run_show_with(&store, json_output)
}

fn run_show_with(store: &TaskStore, json_output: bool) -> Result<i32, TasktreeError> {
    let settings = store.settings()?;
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "settings": output::json::settings_json(&settings)
            })))
            .unwrap()
        );
    } else {
        println!(
            "Minimalist mode: {}",
            if settings.minimalist_mode { "on" } else { "off" }
        );
    }
    Ok(0)
}
