//! Occurrence evaluation.
//!
//! An occurrence is judged only once its scheduled end has passed. It is
//! Present when either
//!  (a) some event at the same location on the same day was completed after
//!      the scheduled end (checked out after the shift), or
//!  (b) a self photo at the same location was captured on the same day.
//! Otherwise it is Absent. Evidence explicitly encoded as "Absent" never
//! counts toward Present.

use crate::models::evidence::{AttendanceEvent, EvidenceSource};
use crate::models::occurrence::Occurrence;
use crate::models::record::AttendanceStatus;
use chrono::NaiveDateTime;

/// Which rule admitted the evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceRule {
    CheckoutAfterEnd,
    SelfPhoto,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pending,
    Present {
        evidence_id: i64,
        rule: PresenceRule,
        verified_at: NaiveDateTime,
    },
    Absent,
}

impl Verdict {
    pub fn status(&self) -> AttendanceStatus {
        match self {
            Verdict::Pending => AttendanceStatus::Pending,
            Verdict::Present { .. } => AttendanceStatus::Present,
            Verdict::Absent => AttendanceStatus::Absent,
        }
    }
}

fn same_place_and_day(occ: &Occurrence, ev: &AttendanceEvent) -> bool {
    ev.scholar_id == occ.scholar_id()
        && ev.location == occ.location()
        && ev.occurred_on() == occ.date
}

/// Rule (a): returns the checkout instant when it is after the scheduled end.
fn checked_out_after_end(occ: &Occurrence, ev: &AttendanceEvent) -> Option<NaiveDateTime> {
    ev.completed_at.filter(|done| *done > occ.ends_at())
}

/// Rule (b): the capture instant of a same-day self photo.
fn self_photo(ev: &AttendanceEvent) -> Option<NaiveDateTime> {
    (ev.source == EvidenceSource::SelfPhoto).then_some(ev.occurred_at)
}

/// `Evaluate(occurrence, candidateEvents)`.
///
/// `candidates` may contain unrelated events; they are filtered here. When
/// several events qualify, the earliest one (by `occurred_at`, then id) is
/// cited as evidence.
pub fn evaluate(occ: &Occurrence, candidates: &[AttendanceEvent], now: NaiveDateTime) -> Verdict {
    if now < occ.ends_at() {
        return Verdict::Pending;
    }

    candidates
        .iter()
        .filter(|ev| same_place_and_day(occ, ev) && !ev.is_explicit_absent())
        .filter_map(|ev| {
            if let Some(done) = checked_out_after_end(occ, ev) {
                Some((ev, PresenceRule::CheckoutAfterEnd, done))
            } else {
                self_photo(ev).map(|at| (ev, PresenceRule::SelfPhoto, at))
            }
        })
        .min_by_key(|(ev, _, _)| (ev.occurred_at, ev.id))
        .map(|(ev, rule, verified_at)| Verdict::Present {
            evidence_id: ev.id,
            rule,
            verified_at,
        })
        .unwrap_or(Verdict::Absent)
}
