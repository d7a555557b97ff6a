use chrono::{Datelike, Duration, NaiveDateTime, Weekday};

use super::NotificationCategory;

const EXPIRY_HOUR: u32 = 9;
const COMPLIANCE_HOUR: u32 = 10;
const DIGEST_HOUR: u32 = 8;

/// Hours of the day that may carry a slot, latest first.
const SLOT_HOURS: [u32; 3] = [COMPLIANCE_HOUR, EXPIRY_HOUR, DIGEST_HOUR];

/// Whether `category` is scheduled at `hour` on `weekday`.
///
/// Expiry notices go out daily at 09:00, compliance reminders on Mondays at 10:00 and
/// digests at 08:00 on weekdays. `All` matches whenever any of them does.
pub fn should_run_notifications(category: NotificationCategory, hour: u32, weekday: Weekday) -> bool {
    match category {
        NotificationCategory::Expiry => hour == EXPIRY_HOUR,
        NotificationCategory::Compliance => weekday == Weekday::Mon && hour == COMPLIANCE_HOUR,
        NotificationCategory::Digest => {
            hour == DIGEST_HOUR && weekday.number_from_monday() <= 5
        }
        NotificationCategory::All => NotificationCategory::SCHEDULED
            .iter()
            .any(|scheduled| should_run_notifications(*scheduled, hour, weekday)),
    }
}

/// Most recent slot of `category` at or before `now`, looking back one week.
pub fn latest_slot(category: NotificationCategory, now: NaiveDateTime) -> Option<NaiveDateTime> {
    (0..=7).find_map(|days_back| {
        let day = now.date() - Duration::days(days_back);
        SLOT_HOURS
            .iter()
            .filter(|hour| should_run_notifications(category, **hour, day.weekday()))
            .filter_map(|hour| day.and_hms_opt(*hour, 0, 0))
            .find(|slot| *slot <= now)
    })
}

/// A category is due when its latest slot has not been covered by a run yet.
pub fn is_due(
    category: NotificationCategory,
    now: NaiveDateTime,
    last_run: Option<NaiveDateTime>,
) -> bool {
    match latest_slot(category, now) {
        Some(slot) => last_run.map_or(true, |last| last < slot),
        None => false,
    }
}
