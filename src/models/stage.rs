use serde::{Deserialize, Serialize};

/// Slugs of stages that end a lead's journey through the pipeline
pub const CLOSED_STAGE_SLUGS: &[&str] = &["closed_won", "closed_lost"];

/// Slug of the stage every new lead starts in
pub const DEFAULT_STAGE_SLUG: &str = "new_contacts";

/// Pipeline stage model
/// Represents an ordered step in the sales pipeline. `position` alone defines
/// display and progress order; positions are unique across stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub position: i64,
    pub slug: Option<String>,
}

impl Stage {
    pub fn new(id: &str, name: &str, position: i64, slug: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            position,
            slug: slug.map(|s| s.to_string()),
        }
    }

    /// Whether this stage is terminal (won or lost)
    pub fn is_closed(&self) -> bool {
        self.slug
            .as_deref()
            .map_or(false, |slug| CLOSED_STAGE_SLUGS.contains(&slug))
    }

    /// Match a stage by id or slug
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.slug.as_deref() == Some(key)
    }
}

/// Sort stages into display order (ascending position)
pub fn sort_stages(stages: &mut [Stage]) {
    stages.sort_by_key(|s| s.position);
}

/// Render progress dots for a stage within the ordered stage set.
/// Filled dots cover every stage up to and including the current one.
pub fn progress_dots(stages: &[Stage], stage_id: &str) -> String {
    let current = stages.iter().find(|s| s.id == stage_id).map(|s| s.position);
    stages
        .iter()
        .map(|s| match current {
            Some(pos) if s.position <= pos => '●',
            _ => '○',
        })
        .collect()
}
