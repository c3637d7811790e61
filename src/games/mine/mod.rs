/// Mine Floors: dig, lift and collect ore floor by floor.

pub mod actions;
pub mod config;
pub mod events;
pub mod logic;
pub mod render;
mod simulator;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::games::Game;
use crate::input::{ClickState, InputEvent};
use crate::time::MS_PER_TICK;

use actions::*;
use config::Balance;
use events::{ConsoleLog, EventLog, MineObserver};
use state::{MineState, Track};

/// A player command after key/click normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Command {
    Select(usize),
    MoveSelection(i32),
    Mine(usize),
    Lift(usize),
    Collect(usize),
    Upgrade(Track),
    Unlock,
}

pub struct MineGame {
    pub state: MineState,
    /// Always-present subscriber that feeds the on-screen log.
    pub log: EventLog,
    observers: Vec<Box<dyn MineObserver>>,
}

impl MineGame {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::with_balance(Balance::default())
    }

    pub fn with_balance(balance: Balance) -> Self {
        Self {
            state: MineState::with_balance(balance),
            log: EventLog::new(),
            observers: vec![Box::new(ConsoleLog)],
        }
    }

    /// Register an extra event subscriber.
    #[cfg(test)]
    pub fn subscribe(&mut self, observer: Box<dyn MineObserver>) {
        self.observers.push(observer);
    }

    /// Hand every queued event to the log and the other subscribers.
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            self.log.notify(&event);
            for observer in &mut self.observers {
                observer.notify(&event);
            }
        }
    }

    fn command_for(&self, event: &InputEvent) -> Option<Command> {
        match event {
            InputEvent::Key(c) => {
                let selected = self.state.selected;
                match c {
                    'j' => Some(Command::MoveSelection(1)),
                    'k' => Some(Command::MoveSelection(-1)),
                    'm' => Some(Command::Mine(selected)),
                    'e' => Some(Command::Lift(selected)),
                    'c' => Some(Command::Collect(selected)),
                    'u' => Some(Command::Unlock),
                    _ => Track::all()
                        .iter()
                        .find(|t| t.key() == *c)
                        .map(|t| Command::Upgrade(*t)),
                }
            }
            InputEvent::Click(id) => {
                let id = *id;
                let floor_offset = (id % FLOOR_RANGE) as usize;
                match id {
                    UPGRADE_MINER => Some(Command::Upgrade(Track::Miner)),
                    UPGRADE_TRANSPORT => Some(Command::Upgrade(Track::Transport)),
                    UPGRADE_ELEVATOR => Some(Command::Upgrade(Track::Elevator)),
                    UPGRADE_POWER => Some(Command::Upgrade(Track::Power)),
                    TRY_UNLOCK => Some(Command::Unlock),
                    _ if (MINE_BASE..LIFT_BASE).contains(&id) => Some(Command::Mine(floor_offset)),
                    _ if (LIFT_BASE..COLLECT_BASE).contains(&id) => Some(Command::Lift(floor_offset)),
                    _ if (COLLECT_BASE..SELECT_FLOOR_BASE).contains(&id) => {
                        Some(Command::Collect(floor_offset))
                    }
                    _ if (SELECT_FLOOR_BASE..UPGRADE_MINER).contains(&id) => {
                        Some(Command::Select(floor_offset))
                    }
                    _ => None,
                }
            }
        }
    }

    fn run(&mut self, command: Command) {
        let state = &mut self.state;
        match command {
            Command::Select(i) => {
                if i < state.floors.len() {
                    state.selected = i;
                }
            }
            Command::MoveSelection(delta) => state.move_selection(delta),
            Command::Mine(i) => {
                logic::mine(state, i);
            }
            Command::Lift(i) => {
                logic::lift(state, i);
            }
            Command::Collect(i) => {
                logic::collect(state, i);
            }
            Command::Upgrade(track) => {
                let selected = state.selected;
                logic::upgrade(state, selected, track);
            }
            Command::Unlock => {
                logic::try_unlock_next(state);
            }
        }
    }
}

impl Game for MineGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let Some(command) = self.command_for(event) else {
            return false;
        };
        self.run(command);
        self.dispatch_events();
        true
    }

    fn tick(&mut self, delta_ticks: u32) {
        logic::tick_n(&mut self.state, delta_ticks, MS_PER_TICK);
        self.log.tick(delta_ticks);
        self.dispatch_events();
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, &self.log, f, area, click_state);
    }
}
