//! Mine game state definitions: floors, upgrade tracks, and stage flags.

use super::config::Balance;
use super::events::MineEvent;

/// The four independently leveled upgrade tracks of a floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Track {
    Miner,
    Transport,
    Elevator,
    Power,
}

impl Track {
    /// All tracks in display order.
    pub fn all() -> &'static [Track] {
        &[Track::Miner, Track::Transport, Track::Elevator, Track::Power]
    }

    pub fn name(&self) -> &str {
        match self {
            Track::Miner => "採掘員",
            Track::Transport => "運搬",
            Track::Elevator => "エレベーター",
            Track::Power => "パワー",
        }
    }

    /// Key that buys this track on the selected floor.
    pub fn key(&self) -> char {
        match self {
            Track::Miner => '1',
            Track::Transport => '2',
            Track::Elevator => '3',
            Track::Power => '4',
        }
    }
}

/// One step of the mine → lift → collect cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Mining,
    Mined,
    Lifting,
    Lifted,
    Collecting,
}

/// A stage operation that has started and not yet completed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingStage {
    /// `Mining`, `Lifting` or `Collecting`.
    pub stage: Stage,
    pub total_ms: u32,
    pub remaining_ms: u32,
}

impl PendingStage {
    /// Fraction of the stage already done, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            1.0
        } else {
            1.0 - self.remaining_ms as f64 / self.total_ms as f64
        }
    }
}

/// One level of the mine.
#[derive(Clone, Debug)]
pub struct Floor {
    /// 1-based depth; index in the floor list is `level - 1`.
    pub level: u32,
    pub is_locked: bool,
    /// Progression marker raised by power upgrades.
    pub floor_level: u32,

    pub miner_level: u32,
    pub transport_level: u32,
    pub elevator_level: u32,
    pub power_level: u32,
    pub power_multiplier: f64,

    pub unlock_cost: f64,
    pub base_income: f64,

    /// Busy lock: a stage operation is in flight.
    pub is_working: bool,
    pub miner_worked: bool,
    pub elevator_worked: bool,
    pub collector_worked: bool,

    pub has_resource: bool,
    pub resource_in_elevator: bool,
    pub resource_at_top: bool,

    /// Set exactly while `is_working` is true.
    pub pending: Option<PendingStage>,
}

impl Floor {
    pub fn new(level: u32, balance: &Balance) -> Self {
        Self {
            level,
            is_locked: level > 1,
            floor_level: 1,
            miner_level: 1,
            transport_level: 1,
            elevator_level: 1,
            power_level: 1,
            power_multiplier: 1.0,
            unlock_cost: balance.unlock_cost(level),
            base_income: balance.base_income(level),
            is_working: false,
            miner_worked: false,
            elevator_worked: false,
            collector_worked: false,
            has_resource: false,
            resource_in_elevator: false,
            resource_at_top: false,
            pending: None,
        }
    }

    /// Clear every per-cycle flag at once.
    pub fn reset_work_state(&mut self) {
        self.miner_worked = false;
        self.elevator_worked = false;
        self.collector_worked = false;
        self.has_resource = false;
        self.resource_in_elevator = false;
        self.resource_at_top = false;
    }

    pub fn level_of(&self, track: Track) -> u32 {
        match track {
            Track::Miner => self.miner_level,
            Track::Transport => self.transport_level,
            Track::Elevator => self.elevator_level,
            Track::Power => self.power_level,
        }
    }

    pub(super) fn level_mut(&mut self, track: Track) -> &mut u32 {
        match track {
            Track::Miner => &mut self.miner_level,
            Track::Transport => &mut self.transport_level,
            Track::Elevator => &mut self.elevator_level,
            Track::Power => &mut self.power_level,
        }
    }

    /// All four tracks at the cap.
    pub fn is_maxed(&self, max_level: u32) -> bool {
        Track::all().iter().all(|t| self.level_of(*t) >= max_level)
    }

    pub fn can_mine(&self) -> bool {
        !self.is_locked && !self.is_working && !self.miner_worked
    }

    pub fn can_lift(&self) -> bool {
        !self.is_locked && !self.is_working && self.miner_worked && !self.elevator_worked
    }

    pub fn can_collect(&self) -> bool {
        !self.is_locked && !self.is_working && self.elevator_worked && !self.collector_worked
    }

    /// Where the floor sits in its production cycle.
    pub fn stage(&self) -> Stage {
        if let Some(p) = &self.pending {
            return p.stage;
        }
        if self.elevator_worked {
            Stage::Lifted
        } else if self.miner_worked {
            Stage::Mined
        } else {
            Stage::Idle
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.stage() {
            Stage::Idle => "採掘員を待っています",
            Stage::Mining => "採掘中…",
            Stage::Mined => "鉱石がエレベーター待ち",
            Stage::Lifting => "運搬中…",
            Stage::Lifted => "鉱石を回収できます",
            Stage::Collecting => "回収中…",
        }
    }

    /// Resource flags that are set (must never exceed one).
    pub fn resource_flag_count(&self) -> usize {
        [self.has_resource, self.resource_in_elevator, self.resource_at_top]
            .iter()
            .filter(|f| **f)
            .count()
    }
}

/// Full state of a mine game.
pub struct MineState {
    pub money: f64,
    /// Ordered by depth, append-only.
    pub floors: Vec<Floor>,
    pub balance: Balance,
    /// Floor that keyboard actions apply to.
    pub selected: usize,
    /// Events emitted since the last drain.
    pub events: Vec<MineEvent>,
    /// Animation frame counter (incremented every tick).
    pub anim_frame: u32,
    pub elapsed_ms: u64,
    pub total_earned: f64,
    pub cycles_completed: u64,
}

impl MineState {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::with_balance(Balance::default())
    }

    pub fn with_balance(balance: Balance) -> Self {
        let balance = balance.sanitized();
        let floors = (1..=balance.starting_floors as u32)
            .map(|level| Floor::new(level, &balance))
            .collect();
        Self {
            money: balance.starting_money,
            floors,
            balance,
            selected: 0,
            events: Vec::new(),
            anim_frame: 0,
            elapsed_ms: 0,
            total_earned: 0.0,
            cycles_completed: 0,
        }
    }

    pub fn emit(&mut self, event: MineEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<MineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Index of the shallowest floor that is still locked.
    pub fn first_locked(&self) -> Option<usize> {
        self.floors.iter().position(|f| f.is_locked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.floors.iter().filter(|f| !f.is_locked).count()
    }

    /// Move the selection cursor, clamped to the floor list.
    pub fn move_selection(&mut self, delta: i32) {
        let last = self.floors.len().saturating_sub(1) as i32;
        self.selected = (self.selected as i32 + delta).clamp(0, last) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_floor_unlocked_rest_locked() {
        let b = Balance::default();
        assert!(!Floor::new(1, &b).is_locked);
        assert!(Floor::new(2, &b).is_locked);
        assert!(Floor::new(7, &b).is_locked);
    }

    #[test]
    fn floor_costs_fixed_at_creation() {
        let b = Balance::default();
        let f = Floor::new(3, &b);
        assert!((f.unlock_cost - 600.0).abs() < 1e-9);
        assert!((f.base_income - 9000.0).abs() < 1e-9);
    }

    #[test]
    fn new_floor_starts_idle_at_level_one() {
        let f = Floor::new(1, &Balance::default());
        for t in Track::all() {
            assert_eq!(f.level_of(*t), 1);
        }
        assert_eq!(f.floor_level, 1);
        assert!((f.power_multiplier - 1.0).abs() < 1e-9);
        assert_eq!(f.stage(), Stage::Idle);
        assert_eq!(f.resource_flag_count(), 0);
    }

    #[test]
    fn reset_clears_every_stage_flag() {
        let mut f = Floor::new(1, &Balance::default());
        f.miner_worked = true;
        f.elevator_worked = true;
        f.collector_worked = true;
        f.resource_at_top = true;
        f.reset_work_state();
        assert!(!f.miner_worked && !f.elevator_worked && !f.collector_worked);
        assert_eq!(f.resource_flag_count(), 0);
    }

    #[test]
    fn stage_follows_flags() {
        let mut f = Floor::new(1, &Balance::default());
        assert!(f.can_mine() && !f.can_lift() && !f.can_collect());
        f.miner_worked = true;
        f.has_resource = true;
        assert_eq!(f.stage(), Stage::Mined);
        assert!(!f.can_mine() && f.can_lift() && !f.can_collect());
        f.elevator_worked = true;
        f.has_resource = false;
        f.resource_in_elevator = true;
        assert_eq!(f.stage(), Stage::Lifted);
        assert!(!f.can_mine() && !f.can_lift() && f.can_collect());
    }

    #[test]
    fn busy_floor_accepts_nothing() {
        let mut f = Floor::new(1, &Balance::default());
        f.is_working = true;
        f.pending = Some(PendingStage {
            stage: Stage::Mining,
            total_ms: 1600,
            remaining_ms: 400,
        });
        assert_eq!(f.stage(), Stage::Mining);
        assert!(!f.can_mine() && !f.can_lift() && !f.can_collect());
        assert!((f.pending.unwrap().progress() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn locked_floor_accepts_nothing() {
        let f = Floor::new(2, &Balance::default());
        assert!(!f.can_mine());
    }

    #[test]
    fn is_maxed_needs_all_four_tracks() {
        let mut f = Floor::new(1, &Balance::default());
        f.miner_level = 5;
        f.transport_level = 5;
        f.elevator_level = 5;
        assert!(!f.is_maxed(5));
        f.power_level = 5;
        assert!(f.is_maxed(5));
    }

    #[test]
    fn state_starts_with_two_floors() {
        let s = MineState::new();
        assert_eq!(s.floors.len(), 2);
        assert_eq!(s.floors[0].level, 1);
        assert_eq!(s.floors[1].level, 2);
        assert_eq!(s.first_locked(), Some(1));
        assert_eq!(s.unlocked_count(), 1);
        assert!((s.money - 0.0).abs() < 1e-9);
    }

    #[test]
    fn selection_clamped() {
        let mut s = MineState::new();
        s.move_selection(-1);
        assert_eq!(s.selected, 0);
        s.move_selection(10);
        assert_eq!(s.selected, 1);
    }
}
