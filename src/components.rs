use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

pub const DEFAULT_RAINFALL_MM: f64 = 50.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 28.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    /// Drought severity in `[0, 1]`.
    pub drought_index: f64,
}

impl Environment {
    pub fn new(rainfall_mm: f64, temperature_c: f64, drought_index: f64) -> Self {
        Self {
            rainfall_mm,
            temperature_c,
            drought_index,
        }
    }

    pub fn with_drought(drought_index: f64) -> Self {
        Self::new(DEFAULT_RAINFALL_MM, DEFAULT_TEMPERATURE_C, drought_index)
    }

    /// Daily loss factor applied to food, doubled for water.
    pub fn drought_impact(&self) -> f64 {
        self.drought_index * 0.5
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::with_drought(0.2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    Food,
    Water,
    Medical,
    Security,
    Shelter,
}

impl InterventionKind {
    pub const ALL: [InterventionKind; 5] = [
        InterventionKind::Food,
        InterventionKind::Water,
        InterventionKind::Medical,
        InterventionKind::Security,
        InterventionKind::Shelter,
    ];

    pub fn duration_days(self) -> u32 {
        match self {
            InterventionKind::Food => 14,
            InterventionKind::Water => 10,
            InterventionKind::Medical => 20,
            InterventionKind::Security => 30,
            InterventionKind::Shelter => 40,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            InterventionKind::Food => "Food Distribution",
            InterventionKind::Water => "Water Supply",
            InterventionKind::Medical => "Medical Aid",
            InterventionKind::Security => "Security Forces",
            InterventionKind::Shelter => "Emergency Shelter",
        }
    }

    /// Short description shown next to a deployed programme.
    pub fn effectiveness(self) -> &'static str {
        match self {
            InterventionKind::Food => "Improves food supply by 14%",
            InterventionKind::Water => "Improves water access by 15%",
            InterventionKind::Medical => "Reduces displacement by 20%",
            InterventionKind::Security => "Improves security by 24%",
            InterventionKind::Shelter => "Improves all metrics slightly",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InterventionKind::Food => "food",
            InterventionKind::Water => "water",
            InterventionKind::Medical => "medical",
            InterventionKind::Security => "security",
            InterventionKind::Shelter => "shelter",
        }
    }
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionKind {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        InterventionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| SimError::UnknownIntervention(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub kind: InterventionKind,
    pub name: String,
    pub remaining_days: u32,
}

impl Intervention {
    pub fn new(kind: InterventionKind) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            remaining_days: kind.duration_days(),
        }
    }

    pub fn effectiveness(&self) -> &'static str {
        self.kind.effectiveness()
    }

    pub fn is_active(&self) -> bool {
        self.remaining_days > 0
    }
}
