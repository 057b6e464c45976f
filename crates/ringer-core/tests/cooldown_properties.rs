//! Property tests for trigger evaluation.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use proptest::prelude::*;
use ringer_core::{Alarm, NewAlarm, TimeOfDay, TriggerEngine, Weekday};

fn base() -> NaiveDateTime {
    // Monday
    NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn alarm(minute_of_day: u16, enabled: bool) -> Alarm {
    let mut alarm = NewAlarm::new(TimeOfDay::from_minute_of_day(minute_of_day).unwrap())
        .repeat(Weekday::ALL)
        .into_alarm("a".into(), Utc::now());
    alarm.enabled = enabled;
    alarm
}

proptest! {
    #[test]
    fn fires_at_most_once_per_window(
        minute in 0u16..1440,
        offsets in prop::collection::vec(0i64..60_000, 1..200),
    ) {
        let mut engine = TriggerEngine::new(Duration::seconds(60));
        let alarms = [alarm(minute, true)];
        let start = base() + Duration::minutes(i64::from(minute));

        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        let fired: usize = sorted
            .iter()
            .map(|ms| engine.evaluate(start + Duration::milliseconds(*ms), &alarms).len())
            .sum();
        prop_assert_eq!(fired, 1);
    }

    #[test]
    fn disabled_alarm_never_fires(
        minute in 0u16..1440,
        ticks in prop::collection::vec(0i64..(7 * 24 * 3600), 1..200),
    ) {
        let mut engine = TriggerEngine::new(Duration::seconds(60));
        let alarms = [alarm(minute, false)];
        for secs in ticks {
            prop_assert!(engine.evaluate(base() + Duration::seconds(secs), &alarms).is_empty());
        }
    }

    #[test]
    fn gap_between_fires_is_at_least_the_window(
        minute in 0u16..1440,
        steps in prop::collection::vec(1i64..90, 1..400),
    ) {
        let mut engine = TriggerEngine::new(Duration::seconds(60));
        let alarms = [alarm(minute, true)];
        let mut now = base() + Duration::minutes(i64::from(minute)) - Duration::seconds(30);
        let mut last: Option<NaiveDateTime> = None;
        for step in steps {
            now += Duration::seconds(step);
            if !engine.evaluate(now, &alarms).is_empty() {
                if let Some(previous) = last {
                    prop_assert!(now - previous >= Duration::seconds(60));
                }
                last = Some(now);
            }
        }
    }
}
