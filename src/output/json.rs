use serde_json::{json, Value};

use crate::error::TasktreeError;
use crate::models::{SharePayload, Settings, Task, ViewState};
use crate::store::views::TaskStatistics;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &TasktreeError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn task_summary(t: &Task) -> Value {
    let mut v = json!({
        "id": t.id,
        "title": t.title,
        "completed": t.completed,
    });
    if let Some(due) = t.due_date {
        v["dueDate"] = json!(due.to_rfc3339());
    }
    if let Some(priority) = t.priority {
        v["priority"] = json!(priority.as_str());
    }
    if let Some(ref parent) = t.parent_id {
        v["parentId"] = json!(parent);
    }
    v
}

pub fn task_detail(t: &Task, completion: u32) -> Value {
    let mut v = serde_json::to_value(t).unwrap_or_else(|_| json!({ "id": t.id }));
    v["completionPercentage"] = json!(completion);
    v
}

pub fn view_state_json(state: &ViewState) -> Value {
    json!({
        "aiPrioritization": state.ai_prioritization,
        "hideCompleted": state.hide_completed,
        "selectedTags": state.selected_tags,
        "searchQuery": state.search_query
    })
}

pub fn settings_json(settings: &Settings) -> Value {
    json!({ "minimalistMode": settings.minimalist_mode })
}

pub fn stats_json(stats: &TaskStatistics) -> Value {
    json!({
        "totalTasks": stats.total_tasks,
        "completedTasks": stats.completed_tasks,
        "overdueTasks": stats.overdue_tasks,
        "completionRate": (stats.completion_rate * 10.0).round() / 10.0,
        "priorities": {
            "high": stats.priorities.high,
            "medium": stats.priorities.medium,
            "low": stats.priorities.low
        },
        "tagUsage": stats.tag_usage
    })
}

pub fn share_payload_json(payload: &SharePayload) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|_| json!({}))
}
