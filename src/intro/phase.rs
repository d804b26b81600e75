use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Named step of the intro timeline, in playback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Entering,
    #[serde(rename = "ready_1")]
    Ready1,
    #[serde(rename = "write_1")]
    Write1,
    #[serde(rename = "erase_1")]
    Erase1,
    #[serde(rename = "ready_2")]
    Ready2,
    #[serde(rename = "write_2")]
    Write2,
    WriteKarion,
    Final,
}

/// Sum of every phase dwell.
pub const TOTAL_RUNTIME: Duration = Duration::from_millis(15_400);

impl Phase {
    pub const COUNT: usize = 8;
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Entering,
        Phase::Ready1,
        Phase::Write1,
        Phase::Erase1,
        Phase::Ready2,
        Phase::Write2,
        Phase::WriteKarion,
        Phase::Final,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Entering => "entering",
            Phase::Ready1 => "ready_1",
            Phase::Write1 => "write_1",
            Phase::Erase1 => "erase_1",
            Phase::Ready2 => "ready_2",
            Phase::Write2 => "write_2",
            Phase::WriteKarion => "write_karion",
            Phase::Final => "final",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn first() -> Phase {
        Phase::ALL[0]
    }

    /// The phase that follows this one, `None` for `Final`.
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }

    /// Sequential waits (ms) making up this phase. Write phases carry a second
    /// wait so the revealed text stays on screen long enough to read.
    pub fn sub_delays_ms(self) -> &'static [u64] {
        match self {
            Phase::Entering => &[1500],
            Phase::Ready1 => &[800],
            Phase::Write1 => &[1600, 1600],
            Phase::Erase1 => &[1400],
            Phase::Ready2 => &[600],
            Phase::Write2 => &[1600, 1600],
            Phase::WriteKarion => &[2500],
            Phase::Final => &[3000],
        }
    }

    pub fn dwell(self) -> Duration {
        Duration::from_millis(self.sub_delays_ms().iter().sum())
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwells_sum_to_total_runtime() {
        let total: Duration = Phase::ALL.iter().map(|p| p.dwell()).sum();
        assert_eq!(total, TOTAL_RUNTIME);
        assert_eq!(total.as_millis(), 15_400);
    }

    #[test]
    fn compound_phases_sum_their_waits() {
        assert_eq!(Phase::Write1.dwell(), Duration::from_millis(3200));
        assert_eq!(Phase::Write2.dwell(), Duration::from_millis(3200));
        assert_eq!(Phase::Entering.dwell(), Duration::from_millis(1500));
    }

    #[test]
    fn next_walks_declared_order() {
        let mut walked = vec![Phase::first()];
        while let Some(p) = walked.last().and_then(|p| p.next()) {
            walked.push(p);
        }
        assert_eq!(walked, Phase::ALL.to_vec());
        assert_eq!(Phase::Final.next(), None);
    }

    #[test]
    fn indices_match_positions() {
        for (i, p) in Phase::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn serde_uses_dashboard_names() {
        assert_eq!(serde_json::to_string(&Phase::Ready1).unwrap(), "\"ready_1\"");
        assert_eq!(serde_json::to_string(&Phase::WriteKarion).unwrap(), "\"write_karion\"");
        for p in Phase::ALL {
            assert_eq!(serde_json::to_value(p).unwrap(), serde_json::json!(p.as_str()));
        }
    }
}
