//! Semantic action IDs for mine click targets.
//!
//! Per-floor actions add the floor index to a base; upgrade actions apply to
//! the selected floor.

// ── Stage cycle (base + floor index) ────────────────────────────
pub const MINE_BASE: u16 = 100;
pub const LIFT_BASE: u16 = 200;
pub const COLLECT_BASE: u16 = 300;

// ── Floor selection (base + floor index) ────────────────────────
pub const SELECT_FLOOR_BASE: u16 = 400;

// ── Upgrades on the selected floor ──────────────────────────────
pub const UPGRADE_MINER: u16 = 500;
pub const UPGRADE_TRANSPORT: u16 = 501;
pub const UPGRADE_ELEVATOR: u16 = 502;
pub const UPGRADE_POWER: u16 = 503;

pub const TRY_UNLOCK: u16 = 510;

/// Width of each per-floor ID range.
pub const FLOOR_RANGE: u16 = 100;
