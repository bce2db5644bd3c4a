//! Role-based navigation.
//!
//! Roles form a closed set. Each route carries a pure visibility predicate
//! over the role and a small context, and all routes live in one static
//! table so visibility rules are declared in a single place.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Advisor,
    Manager,
    Owner,
    Director,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Advisor, Role::Manager, Role::Owner, Role::Director, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Advisor => "advisor",
            Role::Manager => "manager",
            Role::Owner => "owner",
            Role::Director => "director",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.as_str() == s.trim().to_lowercase())
    }
}

/// Facts about the current user that visibility rules may consult
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavContext {
    /// The user has at least one direct report
    pub has_team: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteId {
    Dashboard,
    Pipeline,
    Calendar,
    Activity,
    Team,
    Reports,
    Settings,
}

pub struct Route {
    pub id: RouteId,
    pub path: &'static str,
    pub label: &'static str,
    pub visible: fn(Role, &NavContext) -> bool,
}

fn always(_role: Role, _ctx: &NavContext) -> bool {
    true
}

fn team_visible(role: Role, ctx: &NavContext) -> bool {
    match role {
        Role::Advisor => false,
        Role::Manager => ctx.has_team,
        Role::Owner | Role::Director | Role::Admin => true,
    }
}

fn reports_visible(role: Role, _ctx: &NavContext) -> bool {
    matches!(role, Role::Owner | Role::Director | Role::Admin)
}

fn settings_visible(role: Role, _ctx: &NavContext) -> bool {
    matches!(role, Role::Owner | Role::Admin)
}

pub static ROUTES: &[Route] = &[
    Route { id: RouteId::Dashboard, path: "/dashboard", label: "Dashboard", visible: always },
    Route { id: RouteId::Pipeline, path: "/pipeline", label: "Pipeline", visible: always },
    Route { id: RouteId::Calendar, path: "/calendar", label: "Calendar", visible: always },
    Route { id: RouteId::Activity, path: "/activity", label: "Activity", visible: always },
    Route { id: RouteId::Team, path: "/team", label: "Team", visible: team_visible },
    Route { id: RouteId::Reports, path: "/reports", label: "Reports", visible: reports_visible },
    Route { id: RouteId::Settings, path: "/settings", label: "Settings", visible: settings_visible },
];

/// Routes visible to `role`, in table order
pub fn visible_routes(role: Role, ctx: &NavContext) -> Vec<&'static Route> {
    ROUTES.iter().filter(|r| (r.visible)(role, ctx)).collect()
}
