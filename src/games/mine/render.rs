//! Mine rendering: floor shaft, selected-floor controls, and the event log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::*;
use super::events::EventLog;
use super::logic::{self, format_number};
use super::state::{Floor, MineState, Stage, Track};

/// Spinner for floors with a stage in flight.
const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

/// Width of the stage progress bar in cells.
const BAR_WIDTH: usize = 12;

pub fn render(
    state: &MineState,
    log: &EventLog,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let is_narrow = is_narrow_layout(area.width);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);
    render_header(state, log, f, chunks[0], is_narrow);

    let shaft_height = state.floors.len() as u16 + 2;
    if is_narrow {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(shaft_height), Constraint::Min(10)])
            .split(chunks[1]);
        render_shaft(state, f, body[0], click_state);
        render_floor_panel(state, log, f, body[1], click_state);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(shaft_height), Constraint::Min(10)])
            .split(columns[0]);
        render_shaft(state, f, left[0], click_state);
        render_floor_panel(state, log, f, left[1], click_state);
        render_log(log, f, columns[1]);
    }
}

fn render_header(state: &MineState, log: &EventLog, f: &mut Frame, area: Rect, is_narrow: bool) {
    let money_style = if log.income_flash > 0 {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![Span::styled(
        money_label(state.money),
        money_style,
    )];
    if log.income_flash > 0 {
        spans.push(Span::styled(
            format!(" +{}", format_number(log.last_income)),
            Style::default().fg(Color::Green),
        ));
    }
    spans.push(Span::styled(
        format!(
            "  階層 {}/{}",
            state.unlocked_count(),
            state.balance.max_floors
        ),
        Style::default().fg(Color::Cyan),
    ));
    if !is_narrow {
        spans.push(Span::styled(
            format!(
                "  回収 {}回  累計 ${}  {}",
                state.cycles_completed,
                format_number(state.total_earned),
                play_time(state.elapsed_ms)
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let borders = if is_narrow {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    };
    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(borders)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" ⛏ Mine Floors "),
        )
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

/// Stage markers for the miner → elevator → collector chain.
fn stage_markers(floor: &Floor, anim_frame: u32) -> Vec<Span<'static>> {
    let stage = floor.stage();
    let done = Style::default().fg(Color::Green);
    let todo = Style::default().fg(Color::DarkGray);
    let active = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let spin = SPINNER[(anim_frame / 3) as usize % SPINNER.len()];

    let marker = |label: &str, running: Stage, finished: bool| -> Span<'static> {
        if stage == running {
            Span::styled(format!("{}{}", spin, label), active)
        } else if finished {
            Span::styled(format!("✓{}", label), done)
        } else {
            Span::styled(format!(" {}", label), todo)
        }
    };

    vec![
        marker("採掘", Stage::Mining, floor.miner_worked),
        Span::raw(" → "),
        marker("昇降", Stage::Lifting, floor.elevator_worked),
        Span::raw(" → "),
        marker("回収", Stage::Collecting, floor.collector_worked),
    ]
}

fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
    format!(
        "▕{}{}▏",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

/// Whole dollars only; purchases can leave fractions behind.
fn money_label(money: f64) -> String {
    format!("${}", format_number(money.floor()))
}

fn play_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// First shaft row to draw so the selected floor stays visible.
fn shaft_scroll(selected: usize, visible_rows: u16) -> u16 {
    let visible = visible_rows.max(1) as usize;
    selected.saturating_sub(visible - 1).min(u16::MAX as usize) as u16
}

fn seconds(ms: u32) -> String {
    format!("{:.2}s", ms as f64 / 1000.0)
}

/// One row per floor; tapping a row selects it.
fn render_shaft(
    state: &MineState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    for (i, floor) in state.floors.iter().enumerate() {
        let selected = i == state.selected;
        let cursor = if selected { "▶" } else { " " };
        let name_style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![Span::styled(format!("{}{:>2}F ", cursor, floor.level), name_style)];
        if floor.is_locked {
            spans.push(Span::styled(
                format!("🔒 ${}", format_number(floor.unlock_cost)),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::styled(
                format!("Lv{} ", floor.floor_level),
                Style::default().fg(Color::Cyan),
            ));
            spans.extend(stage_markers(floor, state.anim_frame));
        }
        cl.push_clickable(Line::from(spans), SELECT_FLOOR_BASE + i as u16);
    }

    let scroll = shaft_scroll(state.selected, area.height.saturating_sub(2));
    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, scroll, 0);
    let widget = Paragraph::new(cl.into_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" 坑道 "),
        )
        .scroll((scroll, 0));
    f.render_widget(widget, area);
}

/// Key label plus description; dimmed when the action is unavailable.
fn action_line(key: char, label: String, enabled: bool) -> Line<'static> {
    let (key_style, label_style) = if enabled {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };
    Line::from(vec![
        Span::styled(format!(" [{}] ", key.to_ascii_uppercase()), key_style),
        Span::styled(label, label_style),
    ])
}

/// Controls and upgrades for the selected floor.
fn render_floor_panel(
    state: &MineState,
    log: &EventLog,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let Some(floor) = state.floors.get(state.selected) else {
        return;
    };
    let index = state.selected;
    let balance = &state.balance;
    let mut cl = ClickableList::new();

    if floor.is_locked {
        cl.push(Line::from(Span::styled(
            format!("解放コスト: ${}", format_number(floor.unlock_cost)),
            Style::default().fg(Color::Yellow),
        )));
        if let Some(hint) = logic::unlock_hint(state, index) {
            cl.push(Line::from(Span::styled(
                hint.message(),
                Style::default().fg(Color::Gray),
            )));
        }
        let ready = state.first_locked() == Some(index)
            && logic::unlock_hint(state, index) == Some(logic::UnlockHint::Ready);
        cl.push_clickable(action_line('u', "解放する".into(), ready), TRY_UNLOCK);
    } else {
        cl.push(Line::from(Span::styled(
            floor.status_text(),
            Style::default().fg(Color::White),
        )));
        match &floor.pending {
            Some(p) => cl.push(Line::from(Span::styled(
                format!("{} {}", progress_bar(p.progress()), seconds(p.remaining_ms)),
                Style::default().fg(Color::Green),
            ))),
            None => cl.push(Line::from("")),
        }

        let income = logic::calculate_income(floor, balance);
        cl.push_clickable(
            action_line(
                'm',
                format!("採掘 ({})", seconds(logic::stage_duration_ms(floor, Stage::Mining, balance))),
                floor.can_mine(),
            ),
            MINE_BASE + index as u16,
        );
        cl.push_clickable(
            action_line(
                'e',
                format!("昇降 ({})", seconds(logic::stage_duration_ms(floor, Stage::Lifting, balance))),
                floor.can_lift(),
            ),
            LIFT_BASE + index as u16,
        );
        cl.push_clickable(
            action_line(
                'c',
                format!(
                    "回収 ({}) +${}",
                    seconds(logic::stage_duration_ms(floor, Stage::Collecting, balance)),
                    format_number(income)
                ),
                floor.can_collect(),
            ),
            COLLECT_BASE + index as u16,
        );

        cl.push(Line::from(Span::styled(
            "── 強化 ──",
            Style::default().fg(Color::DarkGray),
        )));
        for track in Track::all() {
            let level = floor.level_of(*track);
            let (label, enabled) = if level >= balance.max_upgrade_level {
                (format!("{} Lv{} (MAX)", track.name(), level), false)
            } else {
                let cost = logic::upgrade_cost(floor, *track, balance);
                (
                    format!("{} Lv{} → ${}", track.name(), level, format_number(cost)),
                    state.money >= cost,
                )
            };
            let action_id = match track {
                Track::Miner => UPGRADE_MINER,
                Track::Transport => UPGRADE_TRANSPORT,
                Track::Elevator => UPGRADE_ELEVATOR,
                Track::Power => UPGRADE_POWER,
            };
            cl.push_clickable(action_line(track.key(), label, enabled), action_id);
        }
    }

    let inner_width = area.width.saturating_sub(2);
    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, inner_width);
    let border = if log.purchase_flash > 0 {
        Color::Magenta
    } else {
        Color::Green
    };
    let title = if floor.is_locked {
        format!(" {}F (ロック中) ", floor.level)
    } else {
        format!(
            " {}F (Lv{} ×{:.1}) ",
            floor.level, floor.floor_level, floor.power_multiplier
        )
    };
    let widget = Paragraph::new(cl.into_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_log(log: &EventLog, f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = log
        .entries
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    // Pin the newest entry to the bottom, counting wrapped rows.
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let visible = area.height.saturating_sub(2) as usize;
    let total = paragraph.line_count(area.width.saturating_sub(2));
    let scroll = total.saturating_sub(visible).min(u16::MAX as usize) as u16;

    let widget = paragraph.scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" ログ "),
    );
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), format!("▕{}▏", "░".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(1.0), format!("▕{}▏", "█".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(0.5).matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(progress_bar(2.0).matches('█').count(), BAR_WIDTH);
    }

    #[test]
    fn money_label_drops_fraction() {
        assert_eq!(money_label(57.5), "$57");
        assert_eq!(money_label(1999.9), "$1,999");
        assert_eq!(money_label(0.0), "$0");
    }

    #[test]
    fn play_time_format() {
        assert_eq!(play_time(0), "00:00");
        assert_eq!(play_time(61_500), "01:01");
    }

    #[test]
    fn shaft_scroll_keeps_selection_visible() {
        assert_eq!(shaft_scroll(0, 10), 0);
        assert_eq!(shaft_scroll(9, 10), 0);
        assert_eq!(shaft_scroll(10, 10), 1);
        assert_eq!(shaft_scroll(99, 10), 90);
        assert_eq!(shaft_scroll(5, 0), 5);
    }

    #[test]
    fn seconds_format() {
        assert_eq!(seconds(1600), "1.60s");
        assert_eq!(seconds(0), "0.00s");
    }

    #[test]
    fn action_line_shows_upper_key() {
        let line = action_line('m', "採掘".into(), true);
        assert_eq!(line.spans[0].content, " [M] ");
    }

    #[test]
    fn stage_markers_track_progress() {
        let s = MineState::new();
        let mut floor = s.floors[0].clone();
        let idle: Vec<String> = stage_markers(&floor, 0)
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(idle.iter().all(|t| !t.starts_with('✓')));

        floor.miner_worked = true;
        let mined: Vec<String> = stage_markers(&floor, 0)
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(mined[0], "✓採掘");
        assert_eq!(mined[2], " 昇降");
    }
}
