pub mod alternatives;
pub mod capacity;
pub mod error;
pub mod model;
pub mod options;
pub mod resolve;
pub mod solver;
pub mod stream;
pub mod text;

use std::collections::HashSet;

use shared::types::{AssignmentGrid, SchedulePlan, SolveRequest, SolveStatus};

use capacity::compile;
use model::{build_worker_views, decisions_to_grid, resolve_pins, signature, Decisions};
use options::SolveOptions;

/// The full output of one planning request: the base plan plus however
/// many distinct alternatives the local-move enumerator and no-good
/// re-solver together produced.
pub struct PlanOutcome {
    pub base: SchedulePlan,
    pub alternatives: Vec<AssignmentGrid>,
}

/// Runs capacity compilation, the base solve, local-move enumeration, and
/// no-good re-solving for a single request. This is the non-streaming
/// entry point; [`stream`] wraps it for incremental delivery.
#[tracing::instrument(skip(request), fields(workers = request.workers.len()))]
pub fn plan_schedule(request: &SolveRequest) -> PlanOutcome {
    let options = SolveOptions::default().with_overrides(
        request.time_limit_seconds,
        request.max_nights_per_worker,
        request.num_alternatives,
    );

    let exclude: Vec<_> = request.exclude_days.clone().unwrap_or_default();
    let capacity = compile(&request.config, &exclude);
    tracing::debug!(
        days = capacity.days.len(),
        shifts = capacity.shifts.len(),
        stations = capacity.stations.len(),
        "compiled capacity"
    );

    let workers = build_worker_views(&request.workers, request.weekly_availability.as_ref());
    let pins = resolve_pins(&capacity, &workers, request.fixed_assignments.as_ref());

    let base_result = solver::solve(&capacity, &workers, &options, &pins, &[]);
    tracing::info!(status = %base_result.status, objective = base_result.objective, "base solve complete");

    let base_grid = decisions_to_grid(&capacity, &workers, &base_result.decisions);
    log_cell_diagnostics(&capacity, &base_grid);

    let base_plan = SchedulePlan {
        days: capacity.days.clone(),
        shifts: capacity.shifts.clone(),
        stations: capacity.stations.clone(),
        assignments: base_grid,
        status: base_result.status,
        objective: base_result.objective,
    };

    if !matches!(base_result.status, SolveStatus::Optimal | SolveStatus::Feasible) {
        return PlanOutcome {
            base: base_plan,
            alternatives: Vec::new(),
        };
    }

    let base_coverage = coverage(&base_result.decisions);
    let mut seen: HashSet<u64> = HashSet::from([signature(&capacity, &base_result.decisions, &workers)]);

    let (mut local_alts, _stats) =
        alternatives::enumerate(&capacity, &workers, &options, &pins, &base_result.decisions);
    for alt in &local_alts {
        seen.insert(signature(&capacity, alt, &workers));
    }

    let remaining = resolve::default_resolve_budget(options.num_alternatives, local_alts.len() as u32);
    let resolved = resolve::resolve_alternatives(
        &capacity,
        &workers,
        &options,
        &pins,
        base_coverage,
        &mut seen,
        remaining,
    );
    local_alts.extend(resolved);

    let alternatives = local_alts
        .into_iter()
        .map(|d| decisions_to_grid(&capacity, &workers, &d))
        .collect();

    PlanOutcome {
        base: base_plan,
        alternatives,
    }
}

/// Emits a `debug` line per role-typed cell comparing required headcount
/// against what actually got seated, so an operator tuning a site's role
/// breakdown can see where shortfalls land without re-running the solve.
fn log_cell_diagnostics(capacity: &capacity::CompiledCapacity, grid: &AssignmentGrid) {
    for &day in &capacity.days {
        for shift in &capacity.shifts {
            for (station_idx, station) in capacity.stations.iter().enumerate() {
                let Some(cell) = capacity.cell(day, shift, station_idx) else {
                    continue;
                };
                if cell.roles.is_empty() {
                    continue;
                }
                let placed = grid
                    .get(&day)
                    .and_then(|m| m.get(shift))
                    .and_then(|rows| rows.get(station_idx))
                    .map(|names| names.len())
                    .unwrap_or(0);
                tracing::debug!(
                    day = %day,
                    shift = %shift,
                    station = %station,
                    required = cell.required_total,
                    placed,
                    "cell role-reserved seats"
                );
            }
        }
    }
}

fn coverage(decisions: &Decisions) -> u32 {
    decisions
        .rows
        .iter()
        .flat_map(|row| row.iter())
        .filter(|d| d.is_some())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Day, ShiftConfig, SiteConfig, StationConfig, Worker};
    use std::collections::HashMap;

    fn site_two_workers_two_cells() -> SiteConfig {
        let mut days = HashMap::new();
        for d in Day::ALL {
            days.insert(d, true);
        }
        let shifts = vec![
            ShiftConfig { name: "06-14".into(), enabled: true, workers: 1, roles: vec![] },
            ShiftConfig { name: "14-22".into(), enabled: true, workers: 1, roles: vec![] },
        ];
        SiteConfig {
            stations: vec![StationConfig {
                name: "Gate".into(),
                per_day_custom: false,
                days,
                shifts,
                day_overrides: HashMap::new(),
                uniform_roles: false,
                workers: 0,
                roles: vec![],
            }],
        }
    }

    fn worker(name: &str) -> Worker {
        let mut availability = HashMap::new();
        for d in Day::ALL {
            availability.insert(d, vec!["06-14".into(), "14-22".into()]);
        }
        Worker {
            id: name.into(),
            name: name.into(),
            max_shifts: 5,
            roles: vec![],
            availability,
        }
    }

    #[test]
    fn empty_roster_yields_no_workers_status_and_no_alternatives() {
        let request = SolveRequest {
            config: site_two_workers_two_cells(),
            workers: vec![],
            time_limit_seconds: Some(1),
            max_nights_per_worker: None,
            num_alternatives: Some(5),
            fixed_assignments: None,
            exclude_days: None,
            weekly_availability: None,
        };
        let outcome = plan_schedule(&request);
        assert_eq!(outcome.base.status, SolveStatus::NoWorkers);
        assert!(outcome.alternatives.is_empty());
        for shift in outcome.base.assignments.values() {
            for row in shift.values() {
                for cell in row {
                    assert!(cell.is_empty());
                }
            }
        }
    }

    #[test]
    fn two_workers_two_cells_assigns_both_distinctly() {
        let request = SolveRequest {
            config: site_two_workers_two_cells(),
            workers: vec![worker("A"), worker("B")],
            time_limit_seconds: Some(2),
            max_nights_per_worker: None,
            num_alternatives: Some(0),
            fixed_assignments: None,
            exclude_days: None,
            weekly_availability: None,
        };
        let outcome = plan_schedule(&request);
        assert!(matches!(
            outcome.base.status,
            SolveStatus::Optimal | SolveStatus::Feasible
        ));

        let sunday = outcome.base.assignments.get(&Day::Sun).unwrap();
        let morning = &sunday["06-14"][0];
        let evening = &sunday["14-22"][0];
        assert_eq!(morning.len(), 1);
        assert_eq!(evening.len(), 1);
        assert_ne!(morning[0], evening[0]);
    }
}
