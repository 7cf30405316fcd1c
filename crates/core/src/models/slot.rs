use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::WatchError;

pub type CourtId = u32;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H%M";

/// On-disk and on-wire shape of a slot: `["2025-01-10", "1100", 100676]`.
pub type SlotRecord = (String, String, CourtId);

/// A single bookable hour-block on one court on one date.
///
/// Ordering is structural: date, then start time, then court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "SlotRecord", try_from = "SlotRecord")]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub court: CourtId,
}

impl Slot {
    pub fn new(date: NaiveDate, start: NaiveTime, court: CourtId) -> Self {
        Self { date, start, court }
    }

    /// Parse a slot from the `YYYY-MM-DD` / `HHMM` string pair used by the booking service.
    pub fn parse(date: &str, start: &str, court: CourtId) -> Result<Self, WatchError> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| WatchError::Parse(format!("invalid slot date {date:?}: {e}")))?;
        let start = NaiveTime::parse_from_str(start, TIME_FORMAT)
            .map_err(|e| WatchError::Parse(format!("invalid slot time {start:?}: {e}")))?;
        Ok(Self { date, start, court })
    }

    /// Wall-clock start of the slot, in whatever timezone the slot grid is defined in.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn time_code(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }

    pub fn date_code(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} court {}", self.date_code(), self.time_code(), self.court)
    }
}

impl From<Slot> for SlotRecord {
    fn from(slot: Slot) -> Self {
        (slot.date_code(), slot.time_code(), slot.court)
    }
}

impl TryFrom<SlotRecord> for Slot {
    type Error = WatchError;

    fn try_from((date, start, court): SlotRecord) -> Result<Self, Self::Error> {
        Slot::parse(&date, &start, court)
    }
}

/// A collection of unique slots. Iteration is always in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotSet(BTreeSet<Slot>);

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, slot: Slot) -> bool {
        self.0.insert(slot)
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.0.contains(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.0.iter()
    }

    /// Slots in `self` that are not in `other`.
    pub fn difference(&self, other: &SlotSet) -> SlotSet {
        self.0.difference(&other.0).copied().collect()
    }

    pub fn union(&self, other: &SlotSet) -> SlotSet {
        self.0.union(&other.0).copied().collect()
    }

    pub fn intersection(&self, other: &SlotSet) -> SlotSet {
        self.0.intersection(&other.0).copied().collect()
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Slot) -> bool,
    {
        self.0.retain(keep);
    }

    /// Drop every slot dated strictly before `today`. Returns how many were removed.
    pub fn prune_before(&mut self, today: NaiveDate) -> usize {
        let before = self.0.len();
        self.0.retain(|slot| slot.date >= today);
        before - self.0.len()
    }
}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Slot> for SlotSet {
    fn extend<I: IntoIterator<Item = Slot>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for SlotSet {
    type Item = Slot;
    type IntoIter = std::collections::btree_set::IntoIter<Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SlotSet {
    type Item = &'a Slot;
    type IntoIter = std::collections::btree_set::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
