use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One of the seven weekday tags, in canonical Sunday-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sun,
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
    ];
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Day::Sun => "sun",
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
        };
        f.write_str(s)
    }
}

/// A single role entry within a shift or station role breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCount {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub count: i64,
}

fn default_true() -> bool {
    true
}

/// A shift entry inside a station's (global or per-day) shift list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub workers: i64,
    #[serde(default)]
    pub roles: Vec<RoleCount>,
}

/// Per-day override of a station's shift list, used when `per_day_custom` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOverride {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub shifts: Vec<ShiftConfig>,
}

/// A single station's full configuration, in either the global or the
/// per-day-custom layout. The capacity compiler is the only place that
/// branches on `per_day_custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    #[serde(default)]
    pub per_day_custom: bool,
    /// Global layout: which days this station is active on.
    #[serde(default)]
    pub days: HashMap<Day, bool>,
    /// Global layout: the shift list shared by every active day.
    #[serde(default)]
    pub shifts: Vec<ShiftConfig>,
    /// Per-day-custom layout: independent shift list per day.
    #[serde(default)]
    pub day_overrides: HashMap<Day, DayOverride>,
    /// When true, every shift on this station shares the station-level
    /// headcount and role breakdown instead of each shift carrying its own.
    #[serde(default)]
    pub uniform_roles: bool,
    #[serde(default)]
    pub workers: i64,
    #[serde(default)]
    pub roles: Vec<RoleCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub stations: Vec<StationConfig>,
}

/// A worker eligible for assignment, with per-day availability expressed
/// as a set of shift names (not indices, so it survives shift reordering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_max_shifts")]
    pub max_shifts: u32,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub availability: HashMap<Day, Vec<String>>,
}

fn default_max_shifts() -> u32 {
    5
}

/// A cell index within the compiled horizon: `assignments[day][shift][station]`.
pub type StationIndex = usize;

/// `fixed_assignments[day][shift][station_index] = names`.
pub type FixedAssignments = HashMap<Day, HashMap<String, HashMap<StationIndex, Vec<String>>>>;

/// `weekly_availability[worker_name][day] = shift names`, replacing (not
/// union-ing with) that worker's base availability for the solve.
pub type WeeklyAvailability = HashMap<String, HashMap<Day, Vec<String>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub config: SiteConfig,
    #[serde(default)]
    pub workers: Vec<Worker>,
    pub time_limit_seconds: Option<u64>,
    pub max_nights_per_worker: Option<u32>,
    pub num_alternatives: Option<u32>,
    #[serde(default)]
    pub fixed_assignments: Option<FixedAssignments>,
    #[serde(default)]
    pub exclude_days: Option<Vec<Day>>,
    #[serde(default)]
    pub weekly_availability: Option<WeeklyAvailability>,
}

/// `assignments[day][shift][station_index] = worker names`, index-aligned
/// with the `stations` list carried alongside it.
pub type AssignmentGrid = HashMap<Day, HashMap<String, Vec<Vec<String>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    NoWorkers,
    Infeasible,
    Error,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::NoWorkers => "NO_WORKERS",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub days: Vec<Day>,
    pub shifts: Vec<String>,
    pub stations: Vec<String>,
    pub assignments: AssignmentGrid,
    pub status: SolveStatus,
    pub objective: f64,
}

/// One record of the streaming driver's output sequence. `base` always
/// precedes any `alternative`; `done` is always last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamRecord {
    Base {
        days: Vec<Day>,
        shifts: Vec<String>,
        stations: Vec<String>,
        assignments: AssignmentGrid,
        status: SolveStatus,
        objective: f64,
    },
    Alternative {
        index: u32,
        assignments: AssignmentGrid,
    },
    Status {
        status: SolveStatus,
        detail: Option<String>,
    },
    Done,
}
