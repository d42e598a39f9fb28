use crate::config::ScoringConfig;
use crate::models::{Jamaah, PrayerStatus};

/// Barakah points for a single prayer log. Pure: the same inputs always
/// produce the same points.
///
/// The congregation multiplier applies only to on-time prayers; every
/// other status awards its fixed configured constant regardless of the
/// jamaah flag.
pub fn points(status: PrayerStatus, jamaah: Jamaah, config: &ScoringConfig) -> u32 {
    match status {
        PrayerStatus::OnTime => {
            let multiplier = if jamaah == Jamaah::Yes {
                config.jamaah_multiplier
            } else {
                1
            };
            config.base_on_time * multiplier
        }
        PrayerStatus::Delayed => config.points_delayed,
        PrayerStatus::Qadaa => config.points_qadaa,
        PrayerStatus::Missed => config.points_missed,
    }
}

/// The monotonic 1..=N sequence behind the reward reveal. N is the
/// congregation multiplier for an on-time jamaah prayer and 1 otherwise,
/// so the count-up is long exactly when the multiplier applies.
pub fn reveal_sequence(status: PrayerStatus, jamaah: Jamaah, config: &ScoringConfig) -> Vec<u32> {
    let top = if status == PrayerStatus::OnTime && jamaah == Jamaah::Yes {
        config.jamaah_multiplier.max(1)
    } else {
        1
    };
    (1..=top).collect()
}

/// Source of randomness for message selection. Injectable so tests can
/// pin the choice.
pub trait RandomSource {
    /// A uniform-ish index in 0..n. n is never 0.
    fn pick(&mut self, n: usize) -> usize;
}

/// Default source backed by the OS entropy pool.
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn pick(&mut self, n: usize) -> usize {
        match getrandom::u32() {
            Ok(v) => v as usize % n,
            Err(_) => 0,
        }
    }
}

const JAMAAH_MESSAGES: &[&str] = &[
    "MashaAllah! 27x the reward for praying in congregation",
    "The reward of jamaah — twenty-seven fold!",
    "Prayed in congregation — may it be accepted",
];

const ON_TIME_MESSAGES: &[&str] = &[
    "Prayed on time — well done",
    "On time, alhamdulillah",
    "Another prayer guarded on time",
];

const RECOVERY_MESSAGES: &[&str] = &[
    "Logged — every prayer counts",
    "Recorded. Tomorrow is a new chance",
];

/// Congratulatory copy for a freshly committed log.
pub fn congratulation(
    status: PrayerStatus,
    jamaah: Jamaah,
    rng: &mut dyn RandomSource,
) -> &'static str {
    let pool = match (status, jamaah) {
        (PrayerStatus::OnTime, Jamaah::Yes) => JAMAAH_MESSAGES,
        (PrayerStatus::OnTime, _) => ON_TIME_MESSAGES,
        _ => RECOVERY_MESSAGES,
    };
    pool[rng.pick(pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-index source for deterministic output.
    struct FixedRandom(usize);

    impl RandomSource for FixedRandom {
        fn pick(&mut self, n: usize) -> usize {
            self.0 % n
        }
    }

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn on_time_jamaah_gets_27x() {
        let c = config();
        assert_eq!(
            points(PrayerStatus::OnTime, Jamaah::Yes, &c),
            c.base_on_time * 27
        );
    }

    #[test]
    fn on_time_alone_gets_base() {
        let c = config();
        assert_eq!(points(PrayerStatus::OnTime, Jamaah::No, &c), c.base_on_time);
        assert_eq!(
            points(PrayerStatus::OnTime, Jamaah::Absent, &c),
            c.base_on_time
        );
    }

    #[test]
    fn multiplier_never_applies_off_time() {
        let c = config();
        // jamaah flag has no effect on delayed/missed/qadaa
        for status in [
            PrayerStatus::Delayed,
            PrayerStatus::Missed,
            PrayerStatus::Qadaa,
        ] {
            assert_eq!(
                points(status, Jamaah::Yes, &c),
                points(status, Jamaah::Absent, &c)
            );
        }
        assert_eq!(points(PrayerStatus::Delayed, Jamaah::Absent, &c), 5);
        assert_eq!(points(PrayerStatus::Qadaa, Jamaah::Absent, &c), 3);
        assert_eq!(points(PrayerStatus::Missed, Jamaah::Absent, &c), 0);
    }

    #[test]
    fn reveal_counts_up_monotonically() {
        let c = config();
        let seq = reveal_sequence(PrayerStatus::OnTime, Jamaah::Yes, &c);
        assert_eq!(seq.first(), Some(&1));
        assert_eq!(seq.last(), Some(&27));
        assert!(seq.windows(2).all(|w| w[1] == w[0] + 1));

        assert_eq!(reveal_sequence(PrayerStatus::OnTime, Jamaah::No, &c), vec![1]);
        assert_eq!(
            reveal_sequence(PrayerStatus::Missed, Jamaah::Absent, &c),
            vec![1]
        );
    }

    #[test]
    fn congratulation_is_deterministic_with_fixed_source() {
        let mut rng = FixedRandom(1);
        let a = congratulation(PrayerStatus::OnTime, Jamaah::Yes, &mut rng);
        let b = congratulation(PrayerStatus::OnTime, Jamaah::Yes, &mut rng);
        assert_eq!(a, b);
        assert_eq!(a, JAMAAH_MESSAGES[1]);
    }
}
