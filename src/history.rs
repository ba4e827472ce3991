use serde::Serialize;

use crate::state::SimulationSnapshot;

/// Trailing range shown by the dashboard charts.
pub const CHART_WINDOW_DAYS: u32 = 30;

/// Per-day series recorded from snapshots, one point per recorded day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct History {
    pub days: Vec<u32>,
    pub population: Vec<u64>,
    pub displaced: Vec<u64>,
    pub food: Vec<f64>,
    pub water: Vec<f64>,
    pub security: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryWindow<'a> {
    pub days: &'a [u32],
    pub population: &'a [u64],
    pub displaced: &'a [u64],
    pub food: &'a [f64],
    pub water: &'a [f64],
    pub security: &'a [f64],
}

impl HistoryWindow<'_> {
    pub fn to_history(&self) -> History {
        History {
            days: self.days.to_vec(),
            population: self.population.to_vec(),
            displaced: self.displaced.to_vec(),
            food: self.food.to_vec(),
            water: self.water.to_vec(),
            security: self.security.to_vec(),
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point. A snapshot for a day already recorded last replaces
    /// that point, so re-publishing after a pause doesn't duplicate it.
    pub fn record(&mut self, snapshot: &SimulationSnapshot) {
        if self.days.last() == Some(&snapshot.day) {
            self.pop_last();
        } else if self.days.last().is_some_and(|&last| snapshot.day < last) {
            // a reset started a new run
            self.clear();
        }
        self.days.push(snapshot.day);
        self.population.push(snapshot.population);
        self.displaced.push(snapshot.displaced_population);
        self.food.push(snapshot.food_supply);
        self.water.push(snapshot.water_access);
        self.security.push(snapshot.security_level);
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Points whose day lies within `span` days of the latest one.
    pub fn window(&self, span: u32) -> HistoryWindow<'_> {
        let start = match self.days.last() {
            Some(&last) => {
                let first_day = last.saturating_sub(span);
                self.days.partition_point(|&day| day < first_day)
            }
            None => 0,
        };
        HistoryWindow {
            days: &self.days[start..],
            population: &self.population[start..],
            displaced: &self.displaced[start..],
            food: &self.food[start..],
            water: &self.water[start..],
            security: &self.security[start..],
        }
    }

    fn pop_last(&mut self) {
        self.days.pop();
        self.population.pop();
        self.displaced.pop();
        self.food.pop();
        self.water.pop();
        self.security.pop();
    }
}
