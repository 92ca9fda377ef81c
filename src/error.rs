use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    TaskNotFound,
    DuplicateTaskId,
    CycleDetected,
    ValidationError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::DuplicateTaskId => "DUPLICATE_TASK_ID",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TasktreeError {
    pub code: ErrorCode,
    pub message: String,
}

impl TasktreeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "tasktree is not initialized. Run `tasktree init` first.",
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn duplicate_task_id(id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateTaskId,
            format!("Task with id '{id}' already exists"),
        )
    }

    pub fn cycle_detected(id: &str) -> Self {
        Self::new(
            ErrorCode::CycleDetected,
            format!("Task {id} would become its own ancestor"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for TasktreeError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
