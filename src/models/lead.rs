use serde::{Deserialize, Serialize};

/// Lead model
/// A sales prospect tracked through pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub stage_id: String,
    pub notes: String,
    pub source: String,
    pub next_follow_up_ts: Option<i64>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

/// Fields supplied when creating a lead.
///
/// `stage_id` carries whatever stage the user had selected; the backend
/// places every new lead in the default stage regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub stage_id: Option<String>,
    pub notes: String,
    pub source: String,
    pub next_follow_up_ts: Option<i64>,
}

impl NewLead {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: "manual".to_string(),
            ..Default::default()
        }
    }
}

/// Named lead filter passed to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadFilter {
    All,
    /// Leads whose stage is not closed
    Active,
    /// Leads in one stage (by id)
    Stage(String),
}

impl LeadFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(LeadFilter::All),
            "active" => Some(LeadFilter::Active),
            _ => s
                .strip_prefix("stage:")
                .filter(|id| !id.is_empty())
                .map(|id| LeadFilter::Stage(id.to_string())),
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            LeadFilter::All => "all".to_string(),
            LeadFilter::Active => "active".to_string(),
            LeadFilter::Stage(id) => format!("stage:{}", id),
        }
    }
}

impl Default for LeadFilter {
    fn default() -> Self {
        LeadFilter::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_filter_parse() {
        assert_eq!(LeadFilter::parse("all"), Some(LeadFilter::All));
        assert_eq!(LeadFilter::parse("active"), Some(LeadFilter::Active));
        assert_eq!(
            LeadFilter::parse("stage:contacted"),
            Some(LeadFilter::Stage("contacted".to_string()))
        );
        assert_eq!(LeadFilter::parse("stage:"), None);
        assert_eq!(LeadFilter::parse("bogus"), None);
    }

    #[test]
    fn test_lead_filter_as_string() {
        assert_eq!(LeadFilter::Active.as_string(), "active");
        assert_eq!(LeadFilter::Stage("s1".to_string()).as_string(), "stage:s1");
    }

    #[test]
    fn test_new_lead_defaults() {
        let lead = NewLead::new("Ada");
        assert_eq!(lead.name, "Ada");
        assert_eq!(lead.source, "manual");
        assert!(lead.stage_id.is_none());
    }
}
