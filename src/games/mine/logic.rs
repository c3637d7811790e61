//! Mine progression rules: pure functions over `MineState`.
//!
//! Every action validates its own preconditions. A failed precondition is a
//! silent no-op: the function returns `false` and leaves the state untouched.

use super::config::Balance;
use super::events::MineEvent;
use super::state::{Floor, MineState, PendingStage, Stage, Track};

// ── Formulas ────────────────────────────────────────────────────

fn stage_ms(base: u32, step: u32, level: u32) -> u32 {
    base.saturating_sub(step.saturating_mul(level))
}

/// How long a started stage runs on this floor.
pub fn stage_duration_ms(floor: &Floor, stage: Stage, balance: &Balance) -> u32 {
    match stage {
        Stage::Mining => stage_ms(balance.mine_ms_base, balance.mine_ms_step, floor.miner_level),
        Stage::Lifting => stage_ms(
            balance.lift_ms_base,
            balance.lift_ms_step,
            floor.elevator_level,
        ),
        Stage::Collecting => stage_ms(
            balance.collect_ms_base,
            balance.collect_ms_step,
            floor.transport_level,
        ),
        Stage::Idle | Stage::Mined | Stage::Lifted => 0,
    }
}

/// Money paid out by one completed collect.
pub fn calculate_income(floor: &Floor, balance: &Balance) -> f64 {
    let mut income = floor.base_income;
    income *= 1.0 + (floor.miner_level as f64 - 1.0) * balance.miner_income_bonus;
    income *= 1.0 + (floor.power_level as f64 - 1.0) * balance.power_income_bonus;
    income.floor()
}

/// Price of the next level on a track.
///
/// Miner, transport and elevator scale with both mine depth and the current
/// track level. Power follows its own linear curve.
pub fn upgrade_cost(floor: &Floor, track: Track, balance: &Balance) -> f64 {
    match track {
        Track::Power => power_upgrade_cost(floor, balance),
        _ => {
            let depth = balance.upgrade_base * balance.upgrade_depth_growth.powi(floor.level as i32 - 1);
            let level = balance
                .upgrade_level_growth
                .powi(floor.level_of(track) as i32 - 1);
            depth * level
        }
    }
}

pub fn power_upgrade_cost(floor: &Floor, balance: &Balance) -> f64 {
    balance.power_cost_step * floor.power_level as f64
}

// ── Stage cycle ─────────────────────────────────────────────────

/// Mark the floor busy and schedule `stage` to complete later.
fn start_stage(state: &mut MineState, index: usize, stage: Stage) {
    let duration_ms = stage_duration_ms(&state.floors[index], stage, &state.balance);
    let floor = &mut state.floors[index];
    floor.is_working = true;
    floor.pending = Some(PendingStage {
        stage,
        total_ms: duration_ms,
        remaining_ms: duration_ms,
    });
    state.emit(MineEvent::StageStarted {
        floor: index,
        stage,
        duration_ms,
    });
}

/// Send the miner to work. Returns true if the stage started.
pub fn mine(state: &mut MineState, index: usize) -> bool {
    match state.floors.get(index) {
        Some(f) if f.can_mine() => {}
        _ => return false,
    }
    start_stage(state, index, Stage::Mining);
    true
}

/// Carry the mined resource up the elevator. Returns true if the stage started.
pub fn lift(state: &mut MineState, index: usize) -> bool {
    match state.floors.get(index) {
        Some(f) if f.can_lift() => {}
        _ => return false,
    }
    start_stage(state, index, Stage::Lifting);
    true
}

/// Collect the lifted resource for money. Returns true if the stage started.
pub fn collect(state: &mut MineState, index: usize) -> bool {
    match state.floors.get(index) {
        Some(f) if f.can_collect() => {}
        _ => return false,
    }
    start_stage(state, index, Stage::Collecting);
    true
}

/// Advance in-flight stages by `delta_ms` and apply the ones that finish.
///
/// A pending stage completes once its remaining time is used up, so a
/// zero-length stage completes on the very next call even when `delta_ms` is 0.
/// Time left over after a completion is discarded: the next stage waits for
/// player input.
pub fn tick(state: &mut MineState, delta_ms: u32) {
    state.elapsed_ms += delta_ms as u64;
    let floor_count = state.floors.len();
    for index in 0..floor_count {
        let Some(pending) = state.floors[index].pending.as_mut() else {
            continue;
        };
        if pending.remaining_ms > delta_ms {
            pending.remaining_ms -= delta_ms;
            continue;
        }
        let stage = pending.stage;
        complete_stage(state, index, stage);
    }
}

/// Advance by fixed game ticks of `ms_per_tick` each.
pub fn tick_n(state: &mut MineState, ticks: u32, ms_per_tick: u32) {
    if ticks == 0 {
        return;
    }
    tick(state, ticks.saturating_mul(ms_per_tick));
    state.anim_frame = state.anim_frame.wrapping_add(ticks);
}

fn complete_stage(state: &mut MineState, index: usize, stage: Stage) {
    let floor = &mut state.floors[index];
    floor.pending = None;
    let resting = match stage {
        Stage::Mining => {
            floor.miner_worked = true;
            floor.has_resource = true;
            Stage::Mined
        }
        Stage::Lifting => {
            floor.elevator_worked = true;
            floor.has_resource = false;
            floor.resource_in_elevator = true;
            Stage::Lifted
        }
        Stage::Collecting => {
            floor.collector_worked = true;
            floor.resource_in_elevator = false;
            floor.resource_at_top = true;
            let income = calculate_income(floor, &state.balance);
            floor.reset_work_state();
            floor.is_working = false;
            state.money += income;
            state.total_earned += income;
            state.cycles_completed += 1;
            state.emit(MineEvent::IncomeCollected {
                floor: index,
                amount: income,
            });
            state.emit(MineEvent::StageCompleted {
                floor: index,
                stage: Stage::Idle,
            });
            check_auto_unlock(state);
            return;
        }
        Stage::Idle | Stage::Mined | Stage::Lifted => stage,
    };
    debug_assert!(floor.resource_flag_count() <= 1);
    floor.is_working = false;
    state.emit(MineEvent::StageCompleted {
        floor: index,
        stage: resting,
    });
}

// ── Upgrades ────────────────────────────────────────────────────

/// Buy the next level of `track` on a floor. Returns true if purchased.
///
/// `Track::Power` is priced and applied exactly like [`upgrade_power`].
pub fn upgrade(state: &mut MineState, index: usize, track: Track) -> bool {
    if track == Track::Power {
        return upgrade_power(state, index);
    }
    let max_level = state.balance.max_upgrade_level;
    let cost = match state.floors.get(index) {
        Some(f) if !f.is_locked && f.level_of(track) < max_level => {
            upgrade_cost(f, track, &state.balance)
        }
        _ => return false,
    };
    if state.money < cost {
        return false;
    }

    state.money -= cost;
    let level = state.floors[index].level_mut(track);
    *level += 1;
    let level = *level;
    state.emit(MineEvent::Upgraded {
        floor: index,
        track,
        level,
        cost,
    });
    check_auto_unlock(state);
    true
}

/// Buy the next power level. Also raises `floor_level` and the power multiplier.
pub fn upgrade_power(state: &mut MineState, index: usize) -> bool {
    let max_level = state.balance.max_upgrade_level;
    let cost = match state.floors.get(index) {
        Some(f) if !f.is_locked && f.power_level < max_level => {
            power_upgrade_cost(f, &state.balance)
        }
        _ => return false,
    };
    if state.money < cost {
        return false;
    }

    state.money -= cost;
    let step = state.balance.power_multiplier_step;
    let floor = &mut state.floors[index];
    floor.power_level += 1;
    floor.power_multiplier = 1.0 + floor.power_level as f64 * step;
    floor.floor_level += 1;
    let level = floor.power_level;
    state.emit(MineEvent::Upgraded {
        floor: index,
        track: Track::Power,
        level,
        cost,
    });
    check_auto_unlock(state);
    true
}

// ── Unlocking ───────────────────────────────────────────────────

/// Why the first locked floor is (or is not) about to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockHint {
    /// The floor above still has tracks below the cap.
    PreviousNotMaxed,
    /// Requirements met except for money.
    NeedMoney,
    /// Everything is in place; it opens on the next check.
    Ready,
}

impl UnlockHint {
    pub fn message(&self) -> &'static str {
        match self {
            UnlockHint::PreviousNotMaxed => "上の階層の強化をすべて最大にしよう",
            UnlockHint::NeedMoney => "お金が足りません",
            UnlockHint::Ready => "条件を満たすと自動で解放されます",
        }
    }
}

/// Unlock status of a locked floor. `None` for unlocked floors or bad indices.
pub fn unlock_hint(state: &MineState, index: usize) -> Option<UnlockHint> {
    let floor = state.floors.get(index)?;
    if !floor.is_locked {
        return None;
    }
    let previous_maxed = match index.checked_sub(1) {
        Some(prev) => state.floors[prev].is_maxed(state.balance.max_upgrade_level),
        None => true,
    };
    Some(if !previous_maxed {
        UnlockHint::PreviousNotMaxed
    } else if state.money < floor.unlock_cost {
        UnlockHint::NeedMoney
    } else {
        UnlockHint::Ready
    })
}

/// Unlock the first locked floor if its predecessor is maxed and the money is
/// there. Appends a fresh locked floor when the last one opens and the cap
/// allows. Returns true if a floor was unlocked.
pub fn try_unlock_next(state: &mut MineState) -> bool {
    let Some(index) = state.first_locked() else {
        return false;
    };
    if unlock_hint(state, index) != Some(UnlockHint::Ready) {
        return false;
    }

    let cost = state.floors[index].unlock_cost;
    state.money -= cost;
    state.floors[index].is_locked = false;
    state.emit(MineEvent::FloorUnlocked { floor: index, cost });

    if index == state.floors.len() - 1 && state.floors.len() < state.balance.max_floors {
        let level = state.floors.len() as u32 + 1;
        let floor = Floor::new(level, &state.balance);
        state.floors.push(floor);
        state.emit(MineEvent::FloorAppended { level });
    }
    true
}

/// Run after purchases and collects.
fn check_auto_unlock(state: &mut MineState) {
    try_unlock_next(state);
}

// ── Formatting ──────────────────────────────────────────────────

/// Format a number with thousands separators and at most one decimal.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    let rounded = (n * 10.0).round() / 10.0;
    let int_part = rounded.floor() as u64;
    let frac = rounded - int_part as f64;

    let digits = int_part.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let tenth = (frac * 10.0).round() as u8;
    if tenth > 0 {
        format!("{}.{}", grouped, tenth)
    } else {
        grouped
    }
}
