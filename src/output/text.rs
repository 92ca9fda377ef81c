use crate::models::{SharePayload, Task, ViewState};
use crate::store::views::TaskStatistics;

pub fn print_task(t: &Task, completion: u32) {
    let marker = if t.completed { "x" } else { " " };
    println!("[{marker}] {} ({})", t.title, t.id);
    if let Some(ref desc) = t.description {
        println!("  Description: {desc}");
    }
    if let Some(due) = t.due_date {
        println!("  Due: {}", due.format("%Y-%m-%d"));
    }
    if let Some(priority) = t.priority {
        println!("  Priority: {}", priority.as_str());
    }
    if let Some(ref parent) = t.parent_id {
        println!("  Parent: {parent}");
    }
    if !t.tags.is_empty() {
        println!("  Tags: {}", t.tags.join(", "));
    }
    if !t.files.is_empty() {
        println!("  Attachments:");
        for f in &t.files {
            println!("    {} ({} bytes, {}) -> {}", f.name, f.size, f.mime_type, f.locator);
        }
    }
    if let Some(ref share_id) = t.share_id {
        println!("  Shared as: {share_id}");
    }
    println!("  Subtree completion: {completion}%");
}

pub fn print_task_line(t: &Task, level: usize) {
    let indent = "  ".repeat(level + 1);
    let marker = if t.completed { "x" } else { " " };
    let priority = t
        .priority
        .map(|p| format!(" !{}", p.as_str()))
        .unwrap_or_default();
    let due = t
        .due_date
        .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    let tags = if t.tags.is_empty() {
        String::new()
    } else {
        format!(" #{}", t.tags.join(" #"))
    };
    // Imported ids are arbitrary strings; truncate on char boundaries.
    let short_id: String = t.id.chars().take(8).collect();
    println!("{indent}[{marker}] {} ({short_id}){priority}{due}{tags}", t.title);
}

pub fn print_empty_list(filtered: bool) {
    if filtered {
        println!("No visible tasks. Try adding a new task or changing your filters.");
    } else {
        println!("No tasks found.");
    }
}

pub fn print_view_state(state: &ViewState) {
    println!("Filters:");
    println!("  AI prioritization: {}", on_off(state.ai_prioritization));
    println!("  Hide completed: {}", on_off(state.hide_completed));
    let tags = if state.selected_tags.is_empty() {
        "(none)".to_string()
    } else {
        state.selected_tags.join(", ")
    };
    println!("  Selected tags: {tags}");
    let query = if state.search_query.is_empty() {
        "(none)"
    } else {
        &state.search_query
    };
    println!("  Search: {query}");
}

pub fn print_stats(stats: &TaskStatistics) {
    println!(
        "Tasks: {} total, {} completed ({:.1}%), {} overdue",
        stats.total_tasks, stats.completed_tasks, stats.completion_rate, stats.overdue_tasks
    );
    println!(
        "Priorities: high={} medium={} low={}",
        stats.priorities.high, stats.priorities.medium, stats.priorities.low
    );
    if !stats.tag_usage.is_empty() {
        println!("Tags:");
        for (tag, count) in &stats.tag_usage {
            println!("  #{tag}: {count}");
        }
    }
}

pub fn print_share_payload(payload: &SharePayload) {
    if let Some(ref tasks) = payload.tasks {
        println!("Shared tasks:");
        for t in tasks {
            let level = usize::from(t.parent_id.is_some());
            print_task_line(t, level);
        }
    }
    if let Some(ref tags) = payload.tags {
        if !tags.is_empty() {
            println!("Shared tags: {}", tags.join(", "));
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
