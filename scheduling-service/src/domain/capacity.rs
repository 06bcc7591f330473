//! Flattens a [`SiteConfig`] into the ordered (day, shift, station) cell
//! grid the model builder and solver operate on. This is the only place
//! that branches on a station's `per_day_custom` layout.

use std::collections::HashMap;

use shared::types::{Day, RoleCount, ShiftConfig, SiteConfig, StationConfig};

use super::text::norm;

const PREFERRED_SHIFT_ORDER: [&str; 3] = ["06-14", "14-22", "22-06"];

/// Required headcount and role reservation for one compiled cell.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub required_total: i64,
    /// Normalized role name -> required count. `Σ count <= required_total`.
    pub roles: HashMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct CompiledCapacity {
    pub days: Vec<Day>,
    pub shifts: Vec<String>,
    pub stations: Vec<String>,
    /// `cells[day][shift]` is a station-index-aligned vector.
    pub cells: HashMap<Day, HashMap<String, Vec<Cell>>>,
}

impl CompiledCapacity {
    pub fn cell(&self, day: Day, shift: &str, station: usize) -> Option<&Cell> {
        self.cells.get(&day)?.get(shift)?.get(station)
    }
}

fn day_active(station: &StationConfig, day: Day) -> bool {
    if station.per_day_custom {
        station
            .day_overrides
            .get(&day)
            .map(|o| o.active)
            .unwrap_or(false)
    } else {
        station.days.get(&day).copied().unwrap_or(false)
    }
}

fn shifts_for(station: &StationConfig, day: Day) -> Vec<ShiftConfig> {
    if station.per_day_custom {
        station
            .day_overrides
            .get(&day)
            .map(|o| o.shifts.clone())
            .unwrap_or_default()
    } else {
        station.shifts.clone()
    }
}

fn roles_map(roles: &[RoleCount]) -> HashMap<String, i64> {
    roles
        .iter()
        .filter(|r| r.enabled && r.count > 0)
        .map(|r| (norm(&r.name), r.count))
        .collect()
}

/// Computes one station's contribution to a single (day, shift) cell, or
/// `None` if the station is inactive on that day/shift.
fn compile_cell(station: &StationConfig, day: Day, shift_name: &str) -> Option<Cell> {
    if !day_active(station, day) {
        return None;
    }
    let shifts = shifts_for(station, day);
    let shift = shifts
        .iter()
        .find(|s| norm(&s.name) == norm(shift_name) && s.enabled)?;

    let (required, roles) = if station.uniform_roles {
        let required = if station.workers > 0 {
            station.workers
        } else {
            roles_map(&station.roles).values().sum()
        };
        (required, roles_map(&station.roles))
    } else {
        let roles = roles_map(&shift.roles);
        let required = if shift.workers > 0 {
            shift.workers
        } else {
            roles.values().sum()
        };
        (required, roles)
    };

    if required <= 0 {
        return None;
    }
    Some(Cell {
        required_total: required,
        roles,
    })
}

fn ordered_shift_names(config: &SiteConfig, active_days: &[Day]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut push_unique = |name: &str| {
        let n = norm(name);
        if !seen.iter().any(|s| s == &n) {
            seen.push(n);
        }
    };

    for station in &config.stations {
        for &day in active_days {
            if !day_active(station, day) {
                continue;
            }
            for shift in shifts_for(station, day) {
                if shift.enabled {
                    push_unique(&shift.name);
                }
            }
        }
    }

    let mut ordered: Vec<String> = PREFERRED_SHIFT_ORDER
        .iter()
        .filter(|p| seen.iter().any(|s| s == *p))
        .map(|s| s.to_string())
        .collect();
    for s in &seen {
        if !ordered.contains(s) {
            ordered.push(s.clone());
        }
    }
    ordered
}

fn ordered_active_days(config: &SiteConfig, exclude: &[Day]) -> Vec<Day> {
    Day::ALL
        .into_iter()
        .filter(|d| !exclude.contains(d))
        .filter(|&d| config.stations.iter().any(|s| day_active(s, d)))
        .collect()
}

/// Compiles a site configuration into the ordered cell grid. Falls back to
/// the default Sun-Sat / 06-14,14-22,22-06 orderings if nothing in the
/// config is active, matching the original solver's defensive defaults.
pub fn compile(config: &SiteConfig, exclude_days: &[Day]) -> CompiledCapacity {
    let mut days = ordered_active_days(config, exclude_days);
    if days.is_empty() {
        days = Day::ALL.into_iter().filter(|d| !exclude_days.contains(d)).collect();
    }

    let mut shifts = ordered_shift_names(config, &days);
    if shifts.is_empty() {
        shifts = PREFERRED_SHIFT_ORDER.iter().map(|s| s.to_string()).collect();
    }

    let stations: Vec<String> = config.stations.iter().map(|s| s.name.clone()).collect();

    let mut cells: HashMap<Day, HashMap<String, Vec<Cell>>> = HashMap::new();
    for &day in &days {
        let mut per_shift: HashMap<String, Vec<Cell>> = HashMap::new();
        for shift in &shifts {
            let row: Vec<Cell> = config
                .stations
                .iter()
                .map(|station| compile_cell(station, day, shift).unwrap_or_default())
                .collect();
            per_shift.insert(shift.clone(), row);
        }
        cells.insert(day, per_shift);
    }

    CompiledCapacity {
        days,
        shifts,
        stations,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, count: i64) -> RoleCount {
        RoleCount {
            name: name.to_string(),
            enabled: true,
            count,
        }
    }

    fn shift(name: &str, workers: i64, roles: Vec<RoleCount>) -> ShiftConfig {
        ShiftConfig {
            name: name.to_string(),
            enabled: true,
            workers,
            roles,
        }
    }

    #[test]
    fn global_layout_compiles_required_total_from_station_workers() {
        let mut days = HashMap::new();
        days.insert(Day::Sun, true);
        let station = StationConfig {
            name: "Gate A".into(),
            per_day_custom: false,
            days,
            shifts: vec![shift("06-14", 2, vec![])],
            day_overrides: HashMap::new(),
            uniform_roles: false,
            workers: 0,
            roles: vec![],
        };
        let config = SiteConfig {
            stations: vec![station],
        };
        let compiled = compile(&config, &[]);
        assert_eq!(compiled.days, vec![Day::Sun]);
        let cell = compiled.cell(Day::Sun, "06-14", 0).unwrap();
        assert_eq!(cell.required_total, 2);
        assert!(cell.roles.is_empty());
    }

    #[test]
    fn role_breakdown_derives_required_total_when_workers_unset() {
        let mut days = HashMap::new();
        days.insert(Day::Mon, true);
        let station = StationConfig {
            name: "Gate B".into(),
            per_day_custom: false,
            days,
            shifts: vec![shift("06-14", 0, vec![role("guard", 1), role("supervisor", 1)])],
            day_overrides: HashMap::new(),
            uniform_roles: false,
            workers: 0,
            roles: vec![],
        };
        let config = SiteConfig {
            stations: vec![station],
        };
        let compiled = compile(&config, &[]);
        let cell = compiled.cell(Day::Mon, "06-14", 0).unwrap();
        assert_eq!(cell.required_total, 2);
        assert_eq!(cell.roles.get("guard"), Some(&1));
        assert_eq!(cell.roles.get("supervisor"), Some(&1));
    }

    #[test]
    fn per_day_custom_layout_only_applies_its_own_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(
            Day::Tue,
            shared::types::DayOverride {
                active: true,
                shifts: vec![shift("14-22", 1, vec![])],
            },
        );
        let station = StationConfig {
            name: "Gate C".into(),
            per_day_custom: true,
            days: HashMap::new(),
            shifts: vec![],
            day_overrides: overrides,
            uniform_roles: false,
            workers: 0,
            roles: vec![],
        };
        let config = SiteConfig {
            stations: vec![station],
        };
        let compiled = compile(&config, &[]);
        assert_eq!(compiled.days, vec![Day::Tue]);
        assert!(compiled.cell(Day::Tue, "06-14", 0).unwrap().required_total == 0);
        assert_eq!(compiled.cell(Day::Tue, "14-22", 0).unwrap().required_total, 1);
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config = SiteConfig { stations: vec![] };
        let compiled = compile(&config, &[]);
        assert_eq!(compiled.days.len(), 7);
        assert_eq!(compiled.shifts, vec!["06-14", "14-22", "22-06"]);
    }
}
