//! Local-move alternative enumerator: starting from the base plan,
//! applies same-day shift swaps, same-day underfill moves, and cross-day
//! swaps, keeping only moves that preserve every hard constraint and the
//! base's total coverage, and that are not a duplicate of an
//! already-emitted schedule.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::capacity::CompiledCapacity;
use super::model::{signature, Decisions, WorkerView};
use super::options::SolveOptions;
use super::solver::validate_full;

#[derive(Debug, Default)]
pub struct EnumerationStats {
    pub produced: u32,
    pub tried: u32,
    pub skipped_duplicate: u32,
    pub skipped_invalid: u32,
}

/// Generates up to `options.num_alternatives` distinct feasible schedules
/// derived from `base` by local moves. The move exploration order is
/// seeded from the base plan's own signature so the same request
/// reproduces the same sequence of alternatives, while a different base
/// plan (a different request) explores a different order.
pub fn enumerate(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    options: &SolveOptions,
    pins: &HashMap<(usize, usize), (usize, usize)>,
    base: &Decisions,
) -> (Vec<Decisions>, EnumerationStats) {
    let mut stats = EnumerationStats::default();
    let mut out = Vec::new();
    if options.num_alternatives == 0 || workers.is_empty() {
        return (out, stats);
    }

    let base_sig = signature(capacity, base, workers);
    let mut seen: HashSet<u64> = HashSet::from([base_sig]);
    let base_coverage = coverage(base);

    let mut rng = StdRng::seed_from_u64(base_sig);
    let mut moves = candidate_moves(capacity, workers, base);
    moves.shuffle(&mut rng);

    for mv in moves {
        if out.len() as u32 >= options.num_alternatives {
            break;
        }
        stats.tried += 1;
        let Some(candidate) = apply_move(base, &mv) else {
            stats.skipped_invalid += 1;
            continue;
        };
        if coverage(&candidate) != base_coverage {
            stats.skipped_invalid += 1;
            continue;
        }
        if !validate_full(capacity, workers, options, pins, &candidate) {
            stats.skipped_invalid += 1;
            continue;
        }
        let sig = signature(capacity, &candidate, workers);
        if !seen.insert(sig) {
            stats.skipped_duplicate += 1;
            continue;
        }
        stats.produced += 1;
        out.push(candidate);
    }

    tracing::info!(
        produced = stats.produced,
        tried = stats.tried,
        skipped_duplicate = stats.skipped_duplicate,
        skipped_invalid = stats.skipped_invalid,
        "alternative enumeration finished"
    );

    (out, stats)
}

fn coverage(decisions: &Decisions) -> u32 {
    decisions
        .rows
        .iter()
        .flat_map(|row| row.iter())
        .filter(|d| d.is_some())
        .count() as u32
}

/// A candidate transformation of the base plan: either a swap between two
/// (worker, day) cells' decisions, or a one-sided relocation of a single
/// worker's single-day decision to a different (shift, station).
enum Move {
    Swap { a: (usize, usize), b: (usize, usize) },
    Relocate {
        worker: usize,
        day: usize,
        to: (usize, usize),
    },
}

fn apply_move(base: &Decisions, mv: &Move) -> Option<Decisions> {
    match *mv {
        Move::Swap { a: (aw, ad), b: (bw, bd) } => {
            let mut out = base.clone();
            let a_dec = out.rows[aw][ad];
            let b_dec = out.rows[bw][bd];
            if a_dec.is_none() && b_dec.is_none() {
                return None;
            }
            out.rows[aw][ad] = b_dec;
            out.rows[bw][bd] = a_dec;
            Some(out)
        }
        Move::Relocate { worker, day, to } => {
            if base.rows[worker][day].is_none() {
                return None;
            }
            let mut out = base.clone();
            out.rows[worker][day] = Some(to);
            Some(out)
        }
    }
}

/// Builds the move candidate list across all three families, in a fixed
/// deterministic enumeration order (the caller shuffles it).
fn candidate_moves(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    base: &Decisions,
) -> Vec<Move> {
    let mut moves = Vec::new();
    let num_days = capacity.days.len();
    let num_workers = workers.len();
    let num_shifts = capacity.shifts.len();
    let num_stations = capacity.stations.len();

    // Occupancy in the base plan, used by family 2 to find cells with
    // remaining capacity (`required_total` not yet reached).
    let mut occupancy = vec![vec![vec![0usize; num_stations]; num_shifts]; num_days];
    for w in 0..num_workers {
        for day in 0..num_days {
            if let Some((s, t)) = base.rows[w][day] {
                occupancy[day][s][t] += 1;
            }
        }
    }

    // Family 1: same-day, same-station shift swap between two assigned workers.
    for day in 0..num_days {
        for w1 in 0..num_workers {
            let Some((s1, t1)) = base.rows[w1][day] else {
                continue;
            };
            for w2 in (w1 + 1)..num_workers {
                if let Some((s2, t2)) = base.rows[w2][day] {
                    if t1 == t2 && s1 != s2 {
                        moves.push(Move::Swap {
                            a: (w1, day),
                            b: (w2, day),
                        });
                    }
                }
            }
        }
    }

    // Family 2: same-day move from a filled cell to a different shift at
    // the same station that still has remaining capacity.
    for day in 0..num_days {
        for w1 in 0..num_workers {
            let Some((s1, t1)) = base.rows[w1][day] else {
                continue;
            };
            for s2 in 0..num_shifts {
                if s2 == s1 {
                    continue;
                }
                let shift_name = &capacity.shifts[s2];
                let required = capacity
                    .cell(capacity.days[day], shift_name, t1)
                    .map(|c| c.required_total)
                    .unwrap_or(0) as usize;
                if occupancy[day][s2][t1] < required {
                    moves.push(Move::Relocate {
                        worker: w1,
                        day,
                        to: (s2, t1),
                    });
                }
            }
        }
    }

    // Family 3: cross-day swap on identical station & shift.
    for w1 in 0..num_workers {
        for d1 in 0..num_days {
            let Some((s1, t1)) = base.rows[w1][d1] else {
                continue;
            };
            for w2 in 0..num_workers {
                if w1 == w2 {
                    continue;
                }
                for d2 in (d1 + 1)..num_days {
                    if let Some((s2, t2)) = base.rows[w2][d2] {
                        if s1 == s2 && t1 == t2 {
                            moves.push(Move::Swap {
                                a: (w1, d1),
                                b: (w2, d2),
                            });
                        }
                    }
                }
            }
        }
    }

    moves
}
