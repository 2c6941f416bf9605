use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SOE_PRIORITY;
use crate::error::{AllotError, Result};
use crate::roster::StudentRecord;

/// Room size -> number of rooms of that size, kept in ascending size order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomDistribution {
    tiers: Vec<(usize, usize)>,
    total_rooms: usize,
    total_capacity: usize,
}

impl RoomDistribution {
    /// Hard ceiling on rooms in one distribution, whatever the caller configures.
    pub const MAX_ROOMS: usize = 1_000_000;

    /// Builds a distribution, rejecting zero sizes and zero counts, totals that
    /// overflow, and more than [`Self::MAX_ROOMS`] rooms. Repeated sizes are merged.
    pub fn new<I>(tiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let overflow = || AllotError::InvalidDistribution("room totals are too large".into());

        let mut merged: BTreeMap<usize, usize> = BTreeMap::new();
        for (size, count) in tiers {
            if size == 0 {
                return Err(AllotError::InvalidDistribution(
                    "room size must be a positive integer".into(),
                ));
            }
            if count == 0 {
                return Err(AllotError::InvalidDistribution(format!(
                    "room count for size {size} must be a positive integer"
                )));
            }
            let entry = merged.entry(size).or_insert(0);
            *entry = entry.checked_add(count).ok_or_else(overflow)?;
        }

        let mut total_rooms: usize = 0;
        let mut total_capacity: usize = 0;
        for (&size, &count) in &merged {
            total_rooms = total_rooms.checked_add(count).ok_or_else(overflow)?;
            total_capacity = size
                .checked_mul(count)
                .and_then(|beds| total_capacity.checked_add(beds))
                .ok_or_else(overflow)?;
        }

        let distribution = Self {
            tiers: merged.into_iter().collect(),
            total_rooms,
            total_capacity,
        };
        distribution.ensure_max_rooms(Self::MAX_ROOMS)?;
        Ok(distribution)
    }

    /// Parses `{"4": 94, "3": 110}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| AllotError::InvalidDistribution(e.to_string()))?;

        let mut tiers = Vec::with_capacity(raw.len());
        for (size, count) in raw {
            let size = usize::from_str(size.trim()).map_err(|_| {
                AllotError::InvalidDistribution(format!("room size {size:?} is not a usable integer"))
            })?;
            let count = count
                .as_u64()
                .and_then(|c| usize::try_from(c).ok())
                .ok_or_else(|| {
                    AllotError::InvalidDistribution(format!(
                        "room count {count} for size {size} is not an integer"
                    ))
                })?;
            tiers.push((size, count));
        }
        Self::new(tiers)
    }

    /// Rejects distributions with more rooms than `max_rooms`.
    pub fn ensure_max_rooms(&self, max_rooms: usize) -> Result<()> {
        if self.total_rooms > max_rooms {
            return Err(AllotError::InvalidDistribution(format!(
                "{} rooms requested, at most {max_rooms} allowed",
                self.total_rooms
            )));
        }
        Ok(())
    }

    pub fn tiers(&self) -> &[(usize, usize)] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn total_rooms(&self) -> usize {
        self.total_rooms
    }

    pub fn total_capacity(&self) -> usize {
        self.total_capacity
    }
}

/// How the priority pass advances when it meets a room with no spare bed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityPass {
    /// Room i is paired with priority student i. A full room consumes the step
    /// and that student moves to the shuffled remainder.
    #[default]
    Literal,
    /// Full rooms are skipped without consuming a priority student.
    SkipFull,
}

impl FromStr for PriorityPass {
    type Err = AllotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "literal" => Ok(PriorityPass::Literal),
            "skipFull" | "skip-full" => Ok(PriorityPass::SkipFull),
            other => Err(AllotError::InvalidOption(format!(
                "unknown priority pass {other:?} (expected literal or skipFull)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllotmentOptions {
    /// Compared case-insensitively with each student's mapped gender.
    pub target_gender: String,
    /// SOE value that gets one-per-room seating first.
    pub soe_priority: String,
    /// Columns copied verbatim into the output records.
    pub extra_fields: Vec<String>,
    pub priority_pass: PriorityPass,
}

impl AllotmentOptions {
    pub fn new(target_gender: impl Into<String>) -> Self {
        Self {
            target_gender: target_gender.into(),
            soe_priority: DEFAULT_SOE_PRIORITY.to_string(),
            extra_fields: Vec::new(),
            priority_pass: PriorityPass::default(),
        }
    }

    pub fn with_soe_priority(mut self, soe_priority: impl Into<String>) -> Self {
        self.soe_priority = soe_priority.into();
        self
    }

    pub fn with_extra_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_fields = fields
            .into_iter()
            .map(Into::into)
            .filter(|f: &String| !f.trim().is_empty())
            .collect();
        self
    }

    pub fn with_priority_pass(mut self, priority_pass: PriorityPass) -> Self {
        self.priority_pass = priority_pass;
        self
    }
}

/// A cohort member with its mapped fields resolved. Missing columns read as "".
#[derive(Debug, Clone, Copy)]
pub struct Student<'a> {
    pub name: &'a str,
    pub roll_no: &'a str,
    pub gender: &'a str,
    pub soe: &'a str,
    pub record: &'a StudentRecord,
}

/// A room being filled.
#[derive(Debug, Clone)]
pub struct RoomSlot<'a> {
    pub capacity: usize,
    pub occupants: Vec<Student<'a>>,
}

impl<'a> RoomSlot<'a> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            occupants: Vec::new(),
        }
    }

    pub fn has_space(&self) -> bool {
        self.occupants.len() < self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllottedStudent {
    pub name: String,
    pub roll_no: String,
    pub soe: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub father_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mother_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllottedRoom {
    pub room_no: usize,
    pub capacity: usize,
    pub students: Vec<AllottedStudent>,
}

/// Result of one allotment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allotment {
    pub rooms: Vec<AllottedRoom>,
    /// Cohort members no room had space for.
    pub unplaced: Vec<AllottedStudent>,
}

impl Allotment {
    pub fn placed_count(&self) -> usize {
        self.rooms.iter().map(|room| room.students.len()).sum()
    }

    pub fn cohort_size(&self) -> usize {
        self.placed_count() + self.unplaced.len()
    }

    pub fn total_capacity(&self) -> usize {
        self.rooms.iter().map(|room| room.capacity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn distribution_parses_in_ascending_size_order() {
        let dist = RoomDistribution::from_json(r#"{"10": 1, "4": 94, "3": 110}"#).unwrap();
        assert_eq!(dist.tiers(), &[(3, 110), (4, 94), (10, 1)]);
        assert_eq!(dist.total_rooms(), 205);
        assert_eq!(dist.total_capacity(), 3 * 110 + 4 * 94 + 10);
    }

    #[test]
    fn empty_distribution_is_valid() {
        let dist = RoomDistribution::from_json("{}").unwrap();
        assert!(dist.is_empty());
        assert_eq!(dist.total_rooms(), 0);
    }

    #[test_case(r#"{"0": 2}"# ; "zero size")]
    #[test_case(r#"{"2": 0}"# ; "zero count")]
    #[test_case(r#"{"2": -1}"# ; "negative count")]
    #[test_case(r#"{"2": 1.5}"# ; "fractional count")]
    #[test_case(r#"{"two": 1}"# ; "non numeric size")]
    #[test_case(r#"[1, 2]"# ; "not an object")]
    #[test_case(r#"{"18446744073709551616": 1}"# ; "size beyond usize")]
    #[test_case(r#"{"18446744073709551615": 2}"# ; "capacity overflow")]
    #[test_case(r#"{"4294967296": 4294967297}"# ; "size times count overflow")]
    #[test_case(r#"{"1": 18446744073709551615, "2": 1}"# ; "room count overflow")]
    #[test_case(r#"{"2": 1000001}"# ; "too many rooms")]
    fn rejects_malformed_distribution(json: &str) {
        let err = RoomDistribution::from_json(json).unwrap_err();
        assert!(matches!(err, AllotError::InvalidDistribution(_)));
    }

    #[test]
    fn huge_room_size_is_a_single_room() {
        let dist = RoomDistribution::from_json(r#"{"18446744073709551615": 1}"#).unwrap();
        assert_eq!(dist.total_rooms(), 1);
        assert_eq!(dist.total_capacity(), usize::MAX);
    }

    #[test]
    fn configured_room_ceiling() {
        let dist = RoomDistribution::new([(2, 30), (3, 20)]).unwrap();
        assert!(dist.ensure_max_rooms(50).is_ok());
        let err = dist.ensure_max_rooms(49).unwrap_err();
        assert!(matches!(err, AllotError::InvalidDistribution(_)));
    }

    #[test]
    fn priority_pass_names() {
        assert_eq!("literal".parse::<PriorityPass>().unwrap(), PriorityPass::Literal);
        assert_eq!("skipFull".parse::<PriorityPass>().unwrap(), PriorityPass::SkipFull);
        assert!("greedy".parse::<PriorityPass>().is_err());
    }

    #[test]
    fn options_default_to_home_state_priority() {
        let options = AllotmentOptions::new("male").with_extra_fields(["Hostel", " "]);
        assert_eq!(options.soe_priority, "Home State");
        assert_eq!(options.extra_fields, vec!["Hostel".to_string()]);
        assert_eq!(options.priority_pass, PriorityPass::Literal);
    }
}
