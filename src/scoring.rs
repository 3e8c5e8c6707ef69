use crate::mode::Mode;

pub const HIT_POINTS: u64 = 10;
pub const SPRAY_COMPLETION_POINTS: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub score: u64,
    pub hits: u32,
    pub misses: u32,
}

impl Tally {
    pub fn hit(&mut self, points: u64) {
        self.score += points;
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.hits, self.misses)
    }
}

/// `hits / (hits + misses)` as a percentage rounded to one decimal, 0 with no clicks.
pub fn accuracy(hits: u32, misses: u32) -> f64 {
    let total = hits + misses;
    if total == 0 {
        return 0.0;
    }
    let pct = f64::from(hits) / f64::from(total) * 100.0;
    (pct * 10.0).round() / 10.0
}

pub fn format_accuracy(pct: f64) -> String {
    format!("{pct:.1}")
}

/// `mm:ss`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Snapshot of a finished session, kept for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mode: Mode,
    pub tally: Tally,
    pub elapsed_secs: u64,
    pub reaction_average_ms: Option<f64>,
}

impl Summary {
    pub fn accuracy(&self) -> f64 {
        self.tally.accuracy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_edges() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(1, 0), 100.0);
        assert_eq!(accuracy(1, 1), 50.0);
        assert_eq!(accuracy(2, 1), 66.7);
        assert_eq!(format_accuracy(accuracy(0, 0)), "0.0");
        assert_eq!(format_accuracy(accuracy(1, 0)), "100.0");
        assert_eq!(format_accuracy(accuracy(1, 2)), "33.3");
    }

    #[test]
    fn test_tally() {
        let mut t = Tally::default();
        t.hit(HIT_POINTS);
        t.hit(SPRAY_COMPLETION_POINTS);
        t.miss();
        assert_eq!(t.score, 110);
        assert_eq!(t.hits, 2);
        assert_eq!(t.misses, 1);
        assert_eq!(t.accuracy(), 66.7);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(3600), "60:00");
    }
}
