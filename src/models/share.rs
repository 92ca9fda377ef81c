use serde::{Deserialize, Serialize};

use super::Task;

/// Shares live for seven days from creation.
pub const SHARE_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Length of the public share token (URL path segment).
pub const SHARE_TOKEN_LEN: usize = 10;

/// Opaque bag snapshotted into a share record. Either side may be absent:
/// a task share carries the subtree plus the root task's tags, a tag share
/// carries labels only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
