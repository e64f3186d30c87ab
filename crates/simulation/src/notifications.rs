//! Engine events and the host-side notification log.
//!
//! The engine pushes [`SimEvent`]s into the city while a tick runs. The host
//! drains them after each tick: `publish_notifications` moves them into the
//! [`NotificationLog`] resource, re-sends them as [`SimNotification`] Bevy
//! events, and logs them.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::census::CityClass;
use crate::city::City;

/// Notification priority, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationPriority {
    Emergency,
    Warning,
    Info,
    Positive,
}

impl NotificationPriority {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationPriority::Emergency => "EMERGENCY",
            NotificationPriority::Warning => "WARNING",
            NotificationPriority::Info => "INFO",
            NotificationPriority::Positive => "POSITIVE",
        }
    }
}

/// Something observable happened inside a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The treasury would have gone negative and was clamped to zero.
    TreasuryDepleted,
    /// Automatic budgeting could not fund every service in full.
    InsufficientFunds { shortfall: i64 },
    /// Plants reach more consumers than they can supply.
    Brownout { demand: u32, capacity: u32 },
    PopulationCollapse { previous: u64 },
    CityClassChanged { from: CityClass, to: CityClass },
    ZoneBurned { x: usize, y: usize },
    /// A road cell hit the traffic cap.
    TrafficPeak { x: usize, y: usize },
    Disaster { x: usize, y: usize },
}

impl SimEvent {
    pub fn priority(&self) -> NotificationPriority {
        match self {
            SimEvent::ZoneBurned { .. } | SimEvent::Disaster { .. } => {
                NotificationPriority::Emergency
            }
            SimEvent::TreasuryDepleted
            | SimEvent::InsufficientFunds { .. }
            | SimEvent::Brownout { .. }
            | SimEvent::PopulationCollapse { .. } => NotificationPriority::Warning,
            SimEvent::TrafficPeak { .. } => NotificationPriority::Info,
            SimEvent::CityClassChanged { .. } => NotificationPriority::Positive,
        }
    }

    /// World tile the event refers to, if any.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            SimEvent::ZoneBurned { x, y }
            | SimEvent::TrafficPeak { x, y }
            | SimEvent::Disaster { x, y } => Some((*x, *y)),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            SimEvent::TreasuryDepleted => "The city treasury is empty".to_string(),
            SimEvent::InsufficientFunds { shortfall } => {
                format!("Insufficient funds: services are {shortfall} short this year")
            }
            SimEvent::Brownout { demand, capacity } => {
                format!("Brownouts: demand {demand} exceeds plant capacity {capacity}")
            }
            SimEvent::PopulationCollapse { previous } => {
                format!("The city has emptied out (was {previous} residents)")
            }
            SimEvent::CityClassChanged { to, .. } => format!("The city is now a {}", to.label()),
            SimEvent::ZoneBurned { x, y } => format!("A building burned down at ({x}, {y})"),
            SimEvent::TrafficPeak { x, y } => format!("Heavy traffic near ({x}, {y})"),
            SimEvent::Disaster { x, y } => format!("Fire reported at ({x}, {y})"),
        }
    }
}

/// Bevy-side copy of a drained [`SimEvent`].
#[derive(Event, Debug, Clone)]
pub struct SimNotification {
    pub event: SimEvent,
    pub year: u64,
    pub month: u64,
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: u64,
    pub text: String,
    pub priority: NotificationPriority,
    pub location: Option<(usize, usize)>,
    pub year: u64,
    pub month: u64,
}

#[derive(Resource)]
pub struct NotificationLog {
    pub journal: Vec<JournalEntry>,
    /// Oldest entries are trimmed beyond this size.
    pub max_journal: usize,
    next_id: u64,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self {
            journal: Vec::new(),
            max_journal: 500,
            next_id: 1,
        }
    }
}

impl NotificationLog {
    pub fn push(&mut self, event: &SimEvent, year: u64, month: u64) {
        let id = self.next_id;
        self.next_id += 1;
        self.journal.push(JournalEntry {
            id,
            text: event.text(),
            priority: event.priority(),
            location: event.location(),
            year,
            month,
        });
        if self.journal.len() > self.max_journal {
            let excess = self.journal.len() - self.max_journal;
            self.journal.drain(0..excess);
        }
    }

    pub fn count(&self, priority: NotificationPriority) -> usize {
        self.journal.iter().filter(|e| e.priority == priority).count()
    }
}

/// Drains engine events after each tick into the log and the Bevy event queue.
pub fn publish_notifications(
    mut city: ResMut<City>,
    mut log: ResMut<NotificationLog>,
    mut writer: EventWriter<SimNotification>,
) {
    let (year, month) = (city.calendar.year(), city.calendar.month());
    for event in city.drain_events() {
        match event.priority() {
            NotificationPriority::Emergency | NotificationPriority::Warning => {
                warn!("[{}] {}", event.priority().label(), event.text())
            }
            _ => info!("[{}] {}", event.priority().label(), event.text()),
        }
        log.push(&event, year, month);
        writer.send(SimNotification { event, year, month });
    }
}
