//! Presentation helpers. Everything here is a pure function of a snapshot
//! so any front end can render the same numbers.

use serde::Serialize;

use crate::event::SimEvent;
use crate::state::SimulationSnapshot;

/// Dot budget used to draw residents and displaced people.
pub const MAX_DOTS: u32 = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetricsPanel {
    pub day: String,
    pub population: String,
    pub displaced: String,
    pub food: String,
    pub water: String,
    pub security: String,
}

pub fn metrics_panel(snapshot: &SimulationSnapshot) -> MetricsPanel {
    MetricsPanel {
        day: snapshot.day.to_string(),
        population: format_count(snapshot.population),
        displaced: format_count(snapshot.displaced_population),
        food: format_percent(snapshot.food_supply),
        water: format_percent(snapshot.water_access),
        security: format_percent(snapshot.security_level),
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_percent(level: f64) -> String {
    format!("{}%", level.round() as i64)
}

/// Log text for an event, with head counts grouped by thousands.
pub fn event_message(event: &SimEvent) -> String {
    match event {
        SimEvent::DiseaseOutbreak { affected } => {
            format!("Disease outbreak affected {} people", format_count(*affected))
        }
        other => other.to_string(),
    }
}

pub fn log_line(day: u32, event: &SimEvent) -> String {
    format!("Day {day}: {}", event_message(event))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PopulationDots {
    pub resident: u32,
    pub displaced: u32,
}

/// Splits [`MAX_DOTS`] in proportion to the initial population, rounding up.
pub fn population_dots(snapshot: &SimulationSnapshot) -> PopulationDots {
    let initial = snapshot.initial_population.max(1) as f64;
    let dots = |count: u64| ((MAX_DOTS as f64) * count as f64 / initial).ceil() as u32;
    PopulationDots {
        resident: dots(snapshot.population),
        displaced: dots(snapshot.displaced_population),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimulationState;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(250_000), "250,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn rounds_percentages() {
        assert_eq!(format_percent(99.85), "100%");
        assert_eq!(format_percent(42.4), "42%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn log_lines_carry_the_day() {
        let line = log_line(12, &SimEvent::DiseaseOutbreak { affected: 1_500 });
        assert_eq!(line, "Day 12: Disease outbreak affected 1,500 people");
        assert_eq!(
            log_line(365, &SimEvent::PeriodEnded),
            "Day 365: Simulation completed: 1 year period ended"
        );
    }

    #[test]
    fn dots_follow_population_split() {
        let mut state = SimulationState::new(250_000, 0.2).unwrap();
        assert_eq!(
            population_dots(&state.snapshot()),
            PopulationDots {
                resident: 500,
                displaced: 0
            }
        );
        state.displace(1);
        let dots = population_dots(&state.snapshot());
        assert_eq!(dots.resident, 500);
        assert_eq!(dots.displaced, 1);
    }

    #[test]
    fn panel_formats_snapshot() {
        let state = SimulationState::new(250_000, 0.2).unwrap();
        let panel = metrics_panel(&state.snapshot());
        assert_eq!(panel.day, "0");
        assert_eq!(panel.population, "250,000");
        assert_eq!(panel.food, "100%");
    }
}
