use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::InterventionKind;

/// Something that happened during a tick, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    ConflictOutbreak,
    RainfallRelief,
    SupplyConvoy,
    DiseaseOutbreak {
        affected: u64,
    },
    InterventionDeployed {
        kind: InterventionKind,
        name: String,
        duration_days: u32,
    },
    InterventionEnded {
        kind: InterventionKind,
        name: String,
    },
    PopulationDisplaced,
    PeriodEnded,
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::ConflictOutbreak => f.write_str("Conflict outbreak reported"),
            SimEvent::RainfallRelief => f.write_str("Heavy rainfall improved water access"),
            SimEvent::SupplyConvoy => f.write_str("Emergency supplies arrived"),
            SimEvent::DiseaseOutbreak { affected } => {
                write!(f, "Disease outbreak affected {affected} people")
            }
            SimEvent::InterventionDeployed {
                name,
                duration_days,
                ..
            } => write!(f, "{name} deployed (lasts {duration_days} days)"),
            SimEvent::InterventionEnded { name, .. } => write!(f, "{name} program has ended"),
            SimEvent::PopulationDisplaced => {
                f.write_str("CRITICAL: All population has been displaced")
            }
            SimEvent::PeriodEnded => f.write_str("Simulation completed: 1 year period ended"),
        }
    }
}
