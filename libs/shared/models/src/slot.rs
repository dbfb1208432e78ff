use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A bookable half-hour label from the fixed daily catalog.
///
/// The catalog is nominal: it says nothing about which slots are actually free for a
/// given doctor or date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot(&'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotBlock {
    Morning,
    Afternoon,
}

pub const TIME_SLOTS: [TimeSlot; 12] = [
    TimeSlot("09:00"),
    TimeSlot("09:30"),
    TimeSlot("10:00"),
    TimeSlot("10:30"),
    TimeSlot("11:00"),
    TimeSlot("11:30"),
    TimeSlot("14:00"),
    TimeSlot("14:30"),
    TimeSlot("15:00"),
    TimeSlot("15:30"),
    TimeSlot("16:00"),
    TimeSlot("16:30"),
];

impl TimeSlot {
    /// Looks up `value` in the catalog. Anything outside it is rejected.
    pub fn parse(value: &str) -> Option<TimeSlot> {
        let value = value.trim();
        TIME_SLOTS.iter().copied().find(|slot| slot.0 == value)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn block(&self) -> SlotBlock {
        if self.0 < "12:00" {
            SlotBlock::Morning
        } else {
            SlotBlock::Afternoon
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeSlot::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("{raw:?} is not a bookable time slot")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_ordered_and_unique() {
        let labels: Vec<&str> = TIME_SLOTS.iter().map(TimeSlot::as_str).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(labels, sorted);
        assert_eq!(labels.len(), 12);
    }

    #[test]
    fn test_parse_only_accepts_catalog_values() {
        assert_eq!(TimeSlot::parse("09:00").map(|s| s.as_str()), Some("09:00"));
        assert_eq!(TimeSlot::parse(" 16:30 ").map(|s| s.as_str()), Some("16:30"));
        assert!(TimeSlot::parse("12:00").is_none());
        assert!(TimeSlot::parse("9:00").is_none());
        assert!(TimeSlot::parse("").is_none());
    }

    #[test]
    fn test_blocks() {
        let morning = TIME_SLOTS.iter().filter(|s| s.block() == SlotBlock::Morning).count();
        assert_eq!(morning, 6);
        assert_eq!(TimeSlot::parse("14:00").map(|s| s.block()), Some(SlotBlock::Afternoon));
        assert_eq!(TimeSlot::parse("11:30").map(|s| s.block()), Some(SlotBlock::Morning));
    }

    #[test]
    fn test_serde_rejects_unknown_slot() {
        let slot: TimeSlot = serde_json::from_str("\"10:30\"").unwrap();
        assert_eq!(slot.as_str(), "10:30");
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"10:30\"");
        assert!(serde_json::from_str::<TimeSlot>("\"13:00\"").is_err());
    }
}
