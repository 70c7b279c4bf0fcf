//! Single forward pass over the gain-annotated series.
//!
//! An open-streak accumulator collects months with `gain > 0`. The first month
//! with `gain <= 0` (or the end of the input) closes it. The month before a
//! streak's first positive gain is only its baseline, never a member.

use chrono::NaiveDate;

use crate::domain::{Observation, Streak, StreakCollection, StreakExtrema, StreakPoint, ValueRange};

/// Partition `observations` (sorted by date) into positive-gain streaks.
///
/// Fewer than two observations yield an empty collection.
pub fn segment(observations: &[Observation]) -> StreakCollection {
    let mut streaks = Vec::new();
    let mut open: Option<OpenStreak> = None;

    // The first observation has no gain and never belongs to a streak.
    for obs in observations.iter().skip(1) {
        match obs.gain {
            Some(gain) if gain > 0.0 => open.get_or_insert_with(|| OpenStreak::new(obs.date)).push(obs, gain),
            _ => {
                if let Some(run) = open.take() {
                    streaks.push(run.close(false));
                }
            }
        }
    }

    if let Some(run) = open.take() {
        streaks.push(run.close(true));
    }

    let extrema = compute_extrema(&streaks);
    StreakCollection { streaks, extrema }
}

/// Global extrema across all streaks; `None` when there are none.
pub fn compute_extrema(streaks: &[Streak]) -> Option<StreakExtrema> {
    let first = streaks.first()?;

    let mut extrema = StreakExtrema {
        cumulative_gain: ValueRange {
            min: first.cumulative_gain,
            max: first.cumulative_gain,
        },
        length: ValueRange {
            min: first.length,
            max: first.length,
        },
        monthly_gain: ValueRange {
            min: first.min_gain(),
            max: first.max_gain(),
        },
    };

    for s in &streaks[1..] {
        extrema.cumulative_gain.min = extrema.cumulative_gain.min.min(s.cumulative_gain);
        extrema.cumulative_gain.max = extrema.cumulative_gain.max.max(s.cumulative_gain);
        extrema.length.min = extrema.length.min.min(s.length);
        extrema.length.max = extrema.length.max.max(s.length);
        extrema.monthly_gain.min = extrema.monthly_gain.min.min(s.min_gain());
        extrema.monthly_gain.max = extrema.monthly_gain.max.max(s.max_gain());
    }

    Some(extrema)
}

struct OpenStreak {
    start: NaiveDate,
    points: Vec<StreakPoint>,
    cumulative: f64,
}

impl OpenStreak {
    fn new(start: NaiveDate) -> Self {
        Self {
            start,
            points: Vec::new(),
            cumulative: 0.0,
        }
    }

    fn push(&mut self, obs: &Observation, gain: f64) {
        self.cumulative += gain;
        self.points.push(StreakPoint {
            date: obs.date,
            level: obs.level,
            gain,
            month_in_streak: self.points.len() + 1,
            cumulative_gain: self.cumulative,
        });
    }

    fn close(self, open: bool) -> Streak {
        let length = self.points.len();
        let end = self.points.last().map(|p| p.date).unwrap_or(self.start);
        Streak {
            start: self.start,
            end,
            length,
            cumulative_gain: self.cumulative,
            average_gain: self.cumulative / length as f64,
            points: self.points,
            open,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Months;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    }

    /// Baseline observation followed by one observation per gain.
    fn observations(gains: &[f64]) -> Vec<Observation> {
        let mut level = 1_000.0;
        let mut out = vec![Observation {
            date: base(),
            level,
            gain: None,
        }];
        for (i, &g) in gains.iter().enumerate() {
            level += g;
            out.push(Observation {
                date: base().checked_add_months(Months::new(i as u32 + 1)).unwrap(),
                level,
                gain: Some(g),
            });
        }
        out
    }

    fn gains_of(s: &Streak) -> Vec<f64> {
        s.points.iter().map(|p| p.gain).collect()
    }

    #[test]
    fn two_streaks_split_by_a_loss() {
        let coll = segment(&observations(&[5.0, 3.0, -1.0, 2.0, 2.0, 2.0]));
        assert_eq!(coll.len(), 2);

        let a = &coll.streaks[0];
        assert_eq!(gains_of(a), vec![5.0, 3.0]);
        assert_eq!(a.length, 2);
        assert_eq!(a.cumulative_gain, 8.0);
        assert_eq!(a.average_gain, 4.0);
        assert!(!a.open);

        let b = &coll.streaks[1];
        assert_eq!(gains_of(b), vec![2.0, 2.0, 2.0]);
        assert_eq!(b.length, 3);
        assert_eq!(b.cumulative_gain, 6.0);
        assert_eq!(b.average_gain, 2.0);
        assert!(b.open);

        let ext = coll.extrema.unwrap();
        assert_eq!(ext.cumulative_gain, ValueRange { min: 6.0, max: 8.0 });
        assert_eq!(ext.length, ValueRange { min: 2, max: 3 });
        assert_eq!(ext.monthly_gain, ValueRange { min: 2.0, max: 5.0 });
    }

    #[test]
    fn single_month_streak_after_losses() {
        let coll = segment(&observations(&[-1.0, -1.0, 1.0]));
        assert_eq!(coll.len(), 1);
        let s = &coll.streaks[0];
        assert_eq!(s.length, 1);
        assert_eq!(s.cumulative_gain, 1.0);
        assert_eq!(s.average_gain, 1.0);
        assert_eq!(s.start, s.end);
    }

    #[test]
    fn streak_running_at_end_of_series_is_finalized() {
        let coll = segment(&observations(&[1.0, 1.0, 1.0]));
        assert_eq!(coll.len(), 1);
        let s = &coll.streaks[0];
        assert_eq!(s.length, 3);
        assert_eq!(s.cumulative_gain, 3.0);
        assert_eq!(s.average_gain, 1.0);
        assert!(s.open);
        assert_eq!(coll.current(), Some(s));
    }

    #[test]
    fn baseline_month_is_not_a_member() {
        let obs = observations(&[-2.0, 4.0, 1.0]);
        let coll = segment(&obs);
        let s = &coll.streaks[0];
        assert_eq!(s.start, obs[2].date);
        assert_eq!(s.end, obs[3].date);
        assert_eq!(s.points[0].month_in_streak, 1);
        assert_eq!(s.points[1].cumulative_gain, 5.0);
        assert_eq!(s.label(), "2000-03 to 2000-04");
    }

    #[test]
    fn zero_gain_closes_a_streak() {
        let coll = segment(&observations(&[1.0, 0.0, 1.0]));
        assert_eq!(coll.len(), 2);
        assert_eq!(coll.streaks[0].length, 1);
        assert_eq!(coll.streaks[1].length, 1);
    }

    #[test]
    fn short_or_flat_inputs_yield_no_streaks() {
        assert_eq!(segment(&[]), StreakCollection::default());
        assert_eq!(segment(&observations(&[])), StreakCollection::default());

        let coll = segment(&observations(&[-1.0, 0.0, -3.0]));
        assert!(coll.is_empty());
        assert!(coll.extrema.is_none());
    }

    #[test]
    fn first_observation_gain_is_ignored() {
        // Even a bogus positive gain on the first row must not start a streak.
        let mut obs = observations(&[-1.0]);
        obs[0].gain = Some(10.0);
        assert!(segment(&obs).is_empty());
    }

    #[test]
    fn randomized_series_partition_positive_months() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(0..60);
            let gains: Vec<f64> = (0..n)
                .map(|_| match rng.gen_range(0..5) {
                    0 => 0.0,
                    _ => rng.gen_range(-300.0..500.0),
                })
                .collect();
            let obs = observations(&gains);
            let coll = segment(&obs);

            let positive: BTreeSet<NaiveDate> = obs
                .iter()
                .skip(1)
                .filter(|o| o.gain.is_some_and(|g| g > 0.0))
                .map(|o| o.date)
                .collect();

            let mut members = BTreeSet::new();
            let mut member_count = 0;
            for s in &coll.streaks {
                assert_eq!(s.length, s.points.len());
                let sum: f64 = s.points.iter().map(|p| p.gain).sum();
                assert_eq!(s.cumulative_gain, sum);
                assert_eq!(s.average_gain, s.cumulative_gain / s.length as f64);
                for p in &s.points {
                    members.insert(p.date);
                    member_count += 1;
                }
            }
            assert_eq!(member_count, members.len(), "a month landed in two streaks");
            assert_eq!(members, positive);

            for w in coll.streaks.windows(2) {
                assert!(w[0].end < w[1].start);
            }

            assert_eq!(segment(&obs), coll);
        }
    }
}
