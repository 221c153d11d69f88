// src/device/types.rs
// Fault list and time program records

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{HtError, Result};

/// Single entry of the device fault list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEntry {
    /// Fault list index
    pub index: usize,
    /// Error code
    pub error: u32,
    /// Date and time the fault was recorded
    pub datetime: NaiveDateTime,
    /// Error message
    pub message: String,
}

/// Time of day with minute resolution, rendered as "HH:MM" (24:00 allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(24 * 60);

    pub fn from_hm(hours: u16, minutes: u16) -> Result<Self> {
        if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
            return Err(HtError::InvalidTimeProgram(format!(
                "{hours:02}:{minutes:02} is not a valid time of day"
            )));
        }
        Ok(TimeOfDay(hours * 60 + minutes))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = HtError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || HtError::InvalidTimeProgram(format!("'{s}' is not a valid time of day"));
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if m.len() != 2 {
            return Err(invalid());
        }
        let hours = h.parse::<u16>().map_err(|_| invalid())?;
        let minutes = m.parse::<u16>().map_err(|_| invalid())?;
        TimeOfDay::from_hm(hours, minutes)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One slot of a time program day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeProgEntry {
    pub state: u32,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeProgEntry {
    pub fn new(state: u32, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { state, start, end }
    }
}

impl Default for TimeProgEntry {
    fn default() -> Self {
        Self::new(0, TimeOfDay::MIDNIGHT, TimeOfDay::MIDNIGHT)
    }
}

/// A time program stored on the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeProgram {
    /// Index of the time program
    pub index: usize,
    pub name: String,
    /// Number of entries a day
    pub ead: usize,
    /// Number of states
    pub nos: u32,
    /// Step size in minutes
    pub ste: u16,
    /// Number of days
    pub nod: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Vec<TimeProgEntry>>>,
}

impl TimeProgram {
    /// A program whose slots are all the default entry
    pub fn blank(index: usize, name: &str, ead: usize, nos: u32, ste: u16, nod: usize) -> Self {
        Self {
            index,
            name: name.to_string(),
            ead,
            nos,
            ste,
            nod,
            entries: Some(vec![vec![TimeProgEntry::default(); ead]; nod]),
        }
    }

    pub fn metadata(&self) -> TimeProgram {
        TimeProgram {
            entries: None,
            ..self.clone()
        }
    }

    pub fn check_slot(&self, day: usize, num: usize) -> Result<()> {
        if day >= self.nod || num >= self.ead {
            return Err(HtError::TimeProgEntryNotFound {
                index: self.index,
                day,
                num,
            });
        }
        Ok(())
    }

    pub fn verify_entry(&self, entry: &TimeProgEntry) -> Result<()> {
        if entry.state >= self.nos {
            return Err(HtError::InvalidTimeProgram(format!(
                "state {} out of range (time program #{} has {} states)",
                entry.state, self.index, self.nos
            )));
        }
        if entry.start > entry.end {
            return Err(HtError::InvalidTimeProgram(format!(
                "start time {} is after end time {}",
                entry.start, entry.end
            )));
        }
        if self.ste > 0 {
            for t in [entry.start, entry.end] {
                if t.minutes() % self.ste != 0 {
                    return Err(HtError::InvalidTimeProgram(format!(
                        "{t} is not a multiple of the {} minute step size",
                        self.ste
                    )));
                }
            }
        }
        Ok(())
    }

    /// Replace all entries after validating the grid dimensions and each entry
    pub fn with_entries(mut self, entries: Vec<Vec<TimeProgEntry>>) -> Result<Self> {
        if entries.len() != self.nod {
            return Err(HtError::InvalidTimeProgram(format!(
                "expected {} days, got {}",
                self.nod,
                entries.len()
            )));
        }
        for (day, slots) in entries.iter().enumerate() {
            if slots.len() != self.ead {
                return Err(HtError::InvalidTimeProgram(format!(
                    "expected {} entries for day {}, got {}",
                    self.ead,
                    day,
                    slots.len()
                )));
            }
            for entry in slots {
                self.verify_entry(entry)?;
            }
        }
        self.entries = Some(entries);
        Ok(self)
    }
}
