//! Balance constants for the mine economy.
//!
//! Every number that shapes progression lives here so it can be tuned without
//! touching the rules. Documents are partial: any field left out keeps its
//! default, so `{"max_floors": 6}` is a valid override.

use serde::{Deserialize, Serialize};

use super::actions::FLOOR_RANGE;

/// Id of the optional `<script type="application/json">` element holding overrides.
#[cfg(target_arch = "wasm32")]
const CONFIG_ELEMENT_ID: &str = "mine-balance";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    /// Upper bound on the number of floors in the mine.
    pub max_floors: usize,
    /// Floors present at the start of a game (the first one unlocked).
    pub starting_floors: usize,
    pub starting_money: f64,
    /// Cap shared by all four upgrade tracks.
    pub max_upgrade_level: u32,

    /// `unlock_cost = unlock_base * unlock_growth^(level-1)`
    pub unlock_base: f64,
    pub unlock_growth: f64,
    /// `base_income = income_base * income_growth^(level-1)`
    pub income_base: f64,
    pub income_growth: f64,
    /// Income bonus per miner level above 1.
    pub miner_income_bonus: f64,
    /// Income bonus per power level above 1.
    pub power_income_bonus: f64,

    /// `cost = upgrade_base * upgrade_depth_growth^(level-1) * upgrade_level_growth^(track-1)`
    pub upgrade_base: f64,
    pub upgrade_depth_growth: f64,
    pub upgrade_level_growth: f64,
    /// Power upgrades cost `power_cost_step * power_level`.
    pub power_cost_step: f64,
    /// `power_multiplier = 1 + power_level * power_multiplier_step`
    pub power_multiplier_step: f64,

    /// Stage durations in ms: `base - level * step`, floored at zero.
    pub mine_ms_base: u32,
    pub mine_ms_step: u32,
    pub lift_ms_base: u32,
    pub lift_ms_step: u32,
    pub collect_ms_base: u32,
    pub collect_ms_step: u32,
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            max_floors: 10,
            starting_floors: 2,
            starting_money: 0.0,
            max_upgrade_level: 5,
            unlock_base: 150.0,
            unlock_growth: 2.0,
            income_base: 1000.0,
            income_growth: 3.0,
            miner_income_bonus: 0.3,
            power_income_bonus: 0.2,
            upgrade_base: 75.0,
            upgrade_depth_growth: 3.0,
            upgrade_level_growth: 1.9,
            power_cost_step: 50.0,
            power_multiplier_step: 0.5,
            mine_ms_base: 2000,
            mine_ms_step: 400,
            lift_ms_base: 1500,
            lift_ms_step: 250,
            collect_ms_base: 1000,
            collect_ms_step: 150,
        }
    }
}

impl Balance {
    /// Parse a (possibly partial) JSON override document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let balance: Balance = serde_json::from_str(json)?;
        Ok(balance.sanitized())
    }

    /// Clamp values that would break the game's structural invariants.
    ///
    /// Per-floor click IDs are `base + index` inside a `FLOOR_RANGE` block, so
    /// the floor cap cannot exceed it.
    pub fn sanitized(mut self) -> Self {
        self.max_floors = self.max_floors.clamp(1, FLOOR_RANGE as usize);
        self.starting_floors = self.starting_floors.clamp(1, self.max_floors);
        self.max_upgrade_level = self.max_upgrade_level.max(1);
        if self.starting_money < 0.0 {
            self.starting_money = 0.0;
        }
        self
    }

    pub fn unlock_cost(&self, level: u32) -> f64 {
        self.unlock_base * self.unlock_growth.powi(level as i32 - 1)
    }

    pub fn base_income(&self, level: u32) -> f64 {
        self.income_base * self.income_growth.powi(level as i32 - 1)
    }
}

/// Read balance overrides from the page, falling back to defaults.
///
/// A missing element is the normal case and is silent; a malformed document is
/// reported on the console and ignored.
pub fn load_balance() -> Balance {
    let Some(text) = page_config_text() else {
        return Balance::default();
    };
    match Balance::from_json(&text) {
        Ok(balance) => {
            console_log("Mine: バランス設定を読み込みました");
            balance
        }
        Err(e) => {
            console_warn(&format!(
                "Mine: バランス設定のパースに失敗（既定値を使用）: {e}"
            ));
            Balance::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn page_config_text() -> Option<String> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content())
}

#[cfg(not(target_arch = "wasm32"))]
fn page_config_text() -> Option<String> {
    None
}

#[cfg(target_arch = "wasm32")]
fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn console_log(_msg: &str) {}

#[cfg(target_arch = "wasm32")]
fn console_warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(msg: &str) {
    eprintln!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_curves() {
        let b = Balance::default();
        assert!((b.unlock_cost(1) - 150.0).abs() < 1e-9);
        assert!((b.unlock_cost(3) - 600.0).abs() < 1e-9);
        assert!((b.base_income(1) - 1000.0).abs() < 1e-9);
        assert!((b.base_income(3) - 9000.0).abs() < 1e-9);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let b = Balance::from_json(r#"{"max_floors": 6, "starting_money": 500}"#).unwrap();
        assert_eq!(b.max_floors, 6);
        assert!((b.starting_money - 500.0).abs() < 1e-9);
        assert_eq!(b.max_upgrade_level, 5);
        assert!((b.upgrade_level_growth - 1.9).abs() < 1e-9);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Balance::from_json("{}").unwrap(), Balance::default());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Balance::from_json("{not json").is_err());
        assert!(Balance::from_json(r#"{"max_floors": "ten"}"#).is_err());
    }

    #[test]
    fn structural_values_are_clamped() {
        let b = Balance::from_json(
            r#"{"max_floors": 0, "starting_floors": 9, "max_upgrade_level": 0, "starting_money": -5}"#,
        )
        .unwrap();
        assert_eq!(b.max_floors, 1);
        assert_eq!(b.starting_floors, 1);
        assert_eq!(b.max_upgrade_level, 1);
        assert!((b.starting_money - 0.0).abs() < 1e-9);
    }

    #[test]
    fn floor_cap_fits_click_id_blocks() {
        let b = Balance::from_json(r#"{"max_floors": 150, "starting_floors": 120}"#).unwrap();
        assert_eq!(b.max_floors, FLOOR_RANGE as usize);
        assert_eq!(b.starting_floors, FLOOR_RANGE as usize);

        let at_cap = Balance::from_json(r#"{"max_floors": 100}"#).unwrap();
        assert_eq!(at_cap.max_floors, 100);
    }

    #[test]
    fn host_load_falls_back_to_defaults() {
        assert_eq!(load_balance(), Balance::default());
    }
}
