use chrono::Duration;

/// Color band for a listed task, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
}

impl Band {
    /// All bands in urgency order
    pub fn all() -> &'static [Band] {
        &[
            Band::Red,
            Band::Yellow,
            Band::Green,
            Band::Cyan,
            Band::Blue,
            Band::Purple,
        ]
    }

    /// Band at a position, clamped to the ends of the spectrum
    pub fn from_index(index: i64) -> Self {
        let bands = Self::all();
        let clamped = index.clamp(0, bands.len() as i64 - 1);
        bands[clamped as usize]
    }

    /// One band per `threshold` of time left; overdue tasks are red
    pub fn for_distance(distance: Duration, threshold: Duration) -> Self {
        let threshold_secs = threshold.num_seconds().max(1);
        Self::from_index(distance.num_seconds() / threshold_secs)
    }

    /// One band per `threshold` of priority
    pub fn for_priority(priority: u32, threshold: u32) -> Self {
        Self::from_index(i64::from(priority / threshold.max(1)))
    }
}
