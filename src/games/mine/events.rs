//! State-change notifications emitted by the mine logic.
//!
//! Logic functions queue events on `MineState`; `MineGame` drains the queue
//! after every input and tick and hands each event to its observers. Nothing
//! here reaches back into game state, so observers can never interfere with a
//! rule being applied.

use super::logic::format_number;
use super::state::{Stage, Track};

#[derive(Clone, Debug, PartialEq)]
pub enum MineEvent {
    StageStarted {
        floor: usize,
        stage: Stage,
        duration_ms: u32,
    },
    /// `stage` is the resting stage reached (`Mined`, `Lifted`, or `Idle` after a collect).
    StageCompleted { floor: usize, stage: Stage },
    IncomeCollected { floor: usize, amount: f64 },
    Upgraded {
        floor: usize,
        track: Track,
        level: u32,
        cost: f64,
    },
    FloorUnlocked { floor: usize, cost: f64 },
    FloorAppended { level: u32 },
}

impl MineEvent {
    /// Human-readable line for logs.
    pub fn describe(&self) -> String {
        match self {
            MineEvent::StageStarted {
                floor,
                stage,
                duration_ms,
            } => format!("{}F: {:?} 開始 ({}ms)", floor + 1, stage, duration_ms),
            MineEvent::StageCompleted { floor, stage } => {
                format!("{}F: {:?}", floor + 1, stage)
            }
            MineEvent::IncomeCollected { floor, amount } => format!(
                "{}F: +${} 回収",
                floor + 1,
                format_number(*amount)
            ),
            MineEvent::Upgraded {
                floor,
                track,
                level,
                cost,
            } => format!(
                "{}F: {} Lv{} (${})",
                floor + 1,
                track.name(),
                level,
                format_number(*cost)
            ),
            MineEvent::FloorUnlocked { floor, cost } => format!(
                "★ {}F 解放！ (${})",
                floor + 1,
                format_number(*cost)
            ),
            MineEvent::FloorAppended { level } => format!("新しい階層 {}F が見つかった", level),
        }
    }

    /// Per-stage progress, too frequent for the in-game log.
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            MineEvent::StageStarted { .. } | MineEvent::StageCompleted { .. }
        )
    }

    /// Milestone events are highlighted in the log.
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            MineEvent::FloorUnlocked { .. } | MineEvent::FloorAppended { .. }
        )
    }
}

/// Subscriber to mine events.
pub trait MineObserver {
    fn notify(&mut self, event: &MineEvent);
}

/// Log entry for the mine game.
#[derive(Clone, Debug)]
pub struct MineLogEntry {
    pub text: String,
    pub is_important: bool,
}

const LOG_CAPACITY: usize = 50;

/// In-game message log plus the short-lived flash timers the renderer reads.
pub struct EventLog {
    pub entries: Vec<MineLogEntry>,
    /// Ticks left on the money flash after income arrives.
    pub income_flash: u32,
    pub last_income: f64,
    /// Ticks left on the purchase/unlock flash.
    pub purchase_flash: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: vec![MineLogEntry {
                text: "鉱山へようこそ！ [M]で採掘を始めよう".into(),
                is_important: true,
            }],
            income_flash: 0,
            last_income: 0.0,
            purchase_flash: 0,
        }
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.entries.push(MineLogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.entries.len() > LOG_CAPACITY {
            self.entries.remove(0);
        }
    }

    /// Count flash timers down.
    pub fn tick(&mut self, delta_ticks: u32) {
        self.income_flash = self.income_flash.saturating_sub(delta_ticks);
        self.purchase_flash = self.purchase_flash.saturating_sub(delta_ticks);
    }
}

impl MineObserver for EventLog {
    fn notify(&mut self, event: &MineEvent) {
        match event {
            MineEvent::IncomeCollected { amount, .. } => {
                self.income_flash = 10;
                self.last_income = *amount;
            }
            MineEvent::Upgraded { .. } | MineEvent::FloorUnlocked { .. } => {
                self.purchase_flash = 8;
            }
            _ => {}
        }
        if !event.is_routine() {
            self.add_log(&event.describe(), event.is_important());
        }
    }
}

/// Mirrors events to the browser console. Does nothing off wasm.
pub struct ConsoleLog;

impl MineObserver for ConsoleLog {
    #[cfg(target_arch = "wasm32")]
    fn notify(&mut self, event: &MineEvent) {
        web_sys::console::log_1(&format!("Mine: {}", event.describe()).into());
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn notify(&mut self, _event: &MineEvent) {}
}
