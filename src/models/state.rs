use serde::{Deserialize, Serialize};

/// View-state persisted alongside the collection. Filters never mutate
/// tasks; they only shape the derived views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub ai_prioritization: bool,
    pub hide_completed: bool,
    pub selected_tags: Vec<String>,
    pub search_query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub minimalist_mode: bool,
}
