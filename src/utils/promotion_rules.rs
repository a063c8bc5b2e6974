//! Rules shared by every promotion kind: state transitions, edit guards and
//! validity-window conflicts. Nothing here touches the database; services load the
//! rows and call in.

use crate::entities::{
    DiscountType, PromotionScope, PromotionSource, PromotionState, promotion_entity,
};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// Allowed: draft -> published, draft -> archived, published -> archived.
pub fn validate_state_transition(current: PromotionState, next: PromotionState) -> AppResult<()> {
    use PromotionState::*;

    match (current, next) {
        (Archived, _) => Err(AppError::ValidationError(
            "Promosi yang sudah diarsipkan tidak dapat diubah".to_string(),
        )),
        (_, Draft) => Err(AppError::ValidationError(
            "Promosi tidak dapat dikembalikan ke status draft".to_string(),
        )),
        (Published, Published) => Err(AppError::ValidationError(
            "Promosi sudah dipublikasikan".to_string(),
        )),
        (Draft, Published) | (Draft, Archived) | (Published, Archived) => Ok(()),
    }
}

pub fn ensure_editable(state: PromotionState) -> AppResult<()> {
    if state == PromotionState::Archived {
        return Err(AppError::ValidationError(
            "Promosi yang sudah diarsipkan tidak dapat diubah".to_string(),
        ));
    }
    Ok(())
}

/// Scope and source are fixed at creation. An update that carries either is refused.
pub fn ensure_scope_and_source_unchanged(
    scope: Option<PromotionScope>,
    source: Option<PromotionSource>,
) -> AppResult<()> {
    if scope.is_some() {
        return Err(AppError::ValidationError(
            "Cakupan promosi tidak dapat diubah".to_string(),
        ));
    }
    if source.is_some() {
        return Err(AppError::ValidationError(
            "Sumber promosi tidak dapat diubah".to_string(),
        ));
    }
    Ok(())
}

/// Inclusive on both ends: windows touching at a single instant overlap.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

pub fn validate_window(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> AppResult<()> {
    if finished_at <= started_at {
        return Err(AppError::ValidationError(
            "Tanggal berakhir harus setelah tanggal mulai".to_string(),
        ));
    }
    Ok(())
}

/// A promotion whose window is already over cannot go live.
pub fn ensure_not_ended(finished_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if finished_at < now {
        return Err(AppError::ValidationError(
            "Promosi yang sudah berakhir tidak dapat dipublikasikan".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_discount(
    discount_type: DiscountType,
    value: i64,
    max_deduction: Option<i64>,
) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::ValidationError(
            "Nilai diskon harus lebih dari 0".to_string(),
        ));
    }
    if discount_type == DiscountType::Percent && value > 100 {
        return Err(AppError::ValidationError(
            "Diskon persentase tidak boleh lebih dari 100".to_string(),
        ));
    }
    if let Some(cap) = max_deduction
        && cap <= 0
    {
        return Err(AppError::ValidationError(
            "Maksimal potongan harus lebih dari 0".to_string(),
        ));
    }
    Ok(())
}

/// The fields of a general promotion that decide whether it may be published.
#[derive(Debug, Clone, Copy)]
pub struct PublishCandidate {
    pub id: Option<i64>,
    pub source: PromotionSource,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub min_purchase: Option<i64>,
}

impl From<&promotion_entity::Model> for PublishCandidate {
    fn from(m: &promotion_entity::Model) -> Self {
        Self {
            id: Some(m.id),
            source: m.source,
            started_at: m.started_at,
            finished_at: m.finished_at,
            min_purchase: m.min_purchase,
        }
    }
}

/// Checks a system-triggered promotion against the published promotions of the same
/// source. Manual and all-branch promotions never conflict.
pub fn find_source_conflict(
    candidate: &PublishCandidate,
    published: &[promotion_entity::Model],
) -> AppResult<()> {
    if !candidate.source.is_system_triggered() {
        return Ok(());
    }

    let others = published.iter().filter(|p| {
        Some(p.id) != candidate.id
            && p.source == candidate.source
            && p.state == PromotionState::Published
    });

    for other in others {
        if windows_overlap(
            candidate.started_at,
            candidate.finished_at,
            other.started_at,
            other.finished_at,
        ) {
            return Err(AppError::ValidationError(format!(
                "Sudah ada promosi {} yang aktif pada periode yang sama",
                candidate.source
            )));
        }

        if candidate.source == PromotionSource::AfterMinPurchase
            && candidate.min_purchase.is_some()
            && candidate.min_purchase == other.min_purchase
        {
            return Err(AppError::ValidationError(
                "Sudah ada promosi dengan minimal pembelian yang sama".to_string(),
            ));
        }
    }

    Ok(())
}

/// Rejects a window that intersects any published window of the same promotion kind on
/// the same inventory row. `windows` yields `(id, started_at, finished_at)`.
pub fn find_window_conflict<I>(
    candidate_id: Option<i64>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    windows: I,
) -> AppResult<()>
where
    I: IntoIterator<Item = (i64, DateTime<Utc>, DateTime<Utc>)>,
{
    let clash = windows.into_iter().any(|(id, start, end)| {
        Some(id) != candidate_id && windows_overlap(started_at, finished_at, start, end)
    });

    if clash {
        return Err(AppError::ValidationError(
            "Periode promosi bertabrakan dengan promosi lain pada produk ini".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PromotionType;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap()
    }

    fn published(id: i64, source: PromotionSource, start: u32, end: u32) -> promotion_entity::Model {
        promotion_entity::Model {
            id,
            name: format!("promo-{id}"),
            description: None,
            scope: PromotionScope::General,
            source,
            state: PromotionState::Published,
            promotion_type: PromotionType::Transaction,
            discount_type: DiscountType::Flat,
            discount_value: 10_000,
            min_purchase: None,
            max_deduction: None,
            min_transaction: None,
            started_at: at(start),
            finished_at: at(end),
            coupon_duration_days: None,
            quota: None,
            claimed: 0,
            store_id: None,
            created_by: 1,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[test]
    fn test_ended_window_cannot_go_live() {
        assert!(ensure_not_ended(at(10), at(9)).is_ok());
        assert!(ensure_not_ended(at(10), at(10)).is_ok());
        assert!(ensure_not_ended(at(10), at(11)).is_err());
    }

    #[test]
    fn test_allowed_transitions() {
        use PromotionState::*;
        assert!(validate_state_transition(Draft, Published).is_ok());
        assert!(validate_state_transition(Draft, Archived).is_ok());
        assert!(validate_state_transition(Published, Archived).is_ok());
    }

    #[test]
    fn test_rejected_transitions() {
        use PromotionState::*;
        for (from, to) in [
            (Archived, Published),
            (Archived, Draft),
            (Archived, Archived),
            (Published, Published),
            (Published, Draft),
            (Draft, Draft),
        ] {
            let err = validate_state_transition(from, to).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{from} -> {to}");
        }
    }

    #[test]
    fn test_scope_or_source_in_update_rejected() {
        assert!(ensure_scope_and_source_unchanged(None, None).is_ok());
        assert!(ensure_scope_and_source_unchanged(Some(PromotionScope::Store), None).is_err());
        assert!(
            ensure_scope_and_source_unchanged(None, Some(PromotionSource::Manual)).is_err()
        );
    }

    #[test]
    fn test_overlap_is_inclusive() {
        // touching at a single point
        assert!(windows_overlap(at(1), at(10), at(10), at(20)));
        assert!(windows_overlap(at(10), at(20), at(1), at(10)));
        // contained
        assert!(windows_overlap(at(5), at(6), at(1), at(10)));
        // disjoint
        assert!(!windows_overlap(at(1), at(9), at(10), at(20)));
        let just_after = at(10) + Duration::seconds(1);
        assert!(!windows_overlap(at(1), at(10), just_after, at(20)));
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountType::Percent, 100, None).is_ok());
        assert!(validate_discount(DiscountType::Percent, 101, None).is_err());
        assert!(validate_discount(DiscountType::Flat, 150_000, None).is_ok());
        assert!(validate_discount(DiscountType::Flat, 0, None).is_err());
        assert!(validate_discount(DiscountType::Percent, 10, Some(0)).is_err());
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window(at(1), at(2)).is_ok());
        assert!(validate_window(at(2), at(2)).is_err());
        assert!(validate_window(at(3), at(2)).is_err());
    }

    #[test]
    fn test_system_source_overlap_rejected() {
        let existing = vec![published(1, PromotionSource::ReferralBonus, 1, 10)];
        let candidate = PublishCandidate {
            id: None,
            source: PromotionSource::ReferralBonus,
            started_at: at(10),
            finished_at: at(20),
            min_purchase: None,
        };
        assert!(find_source_conflict(&candidate, &existing).is_err());

        let later = PublishCandidate {
            started_at: at(11),
            ..candidate
        };
        assert!(find_source_conflict(&later, &existing).is_ok());
    }

    #[test]
    fn test_different_source_does_not_conflict() {
        let existing = vec![published(1, PromotionSource::ReferralBonusReferee, 1, 10)];
        let candidate = PublishCandidate {
            id: None,
            source: PromotionSource::ReferralBonus,
            started_at: at(1),
            finished_at: at(10),
            min_purchase: None,
        };
        assert!(find_source_conflict(&candidate, &existing).is_ok());
    }

    #[test]
    fn test_manual_source_never_conflicts() {
        let existing = vec![published(1, PromotionSource::Manual, 1, 10)];
        let candidate = PublishCandidate {
            id: None,
            source: PromotionSource::Manual,
            started_at: at(1),
            finished_at: at(10),
            min_purchase: None,
        };
        assert!(find_source_conflict(&candidate, &existing).is_ok());
    }

    #[test]
    fn test_min_purchase_threshold_must_be_unique() {
        let mut existing = published(1, PromotionSource::AfterMinPurchase, 1, 5);
        existing.min_purchase = Some(200_000);
        let candidate = PublishCandidate {
            id: None,
            source: PromotionSource::AfterMinPurchase,
            started_at: at(20),
            finished_at: at(25),
            min_purchase: Some(200_000),
        };
        // windows are disjoint but the threshold is shared
        assert!(find_source_conflict(&candidate, &[existing.clone()]).is_err());

        let other_threshold = PublishCandidate {
            min_purchase: Some(300_000),
            ..candidate
        };
        assert!(find_source_conflict(&other_threshold, &[existing]).is_ok());
    }

    #[test]
    fn test_min_transaction_has_no_threshold_check() {
        let mut existing = published(1, PromotionSource::AfterMinTransaction, 1, 5);
        existing.min_transaction = Some(3);
        let candidate = PublishCandidate {
            id: None,
            source: PromotionSource::AfterMinTransaction,
            started_at: at(20),
            finished_at: at(25),
            min_purchase: None,
        };
        assert!(find_source_conflict(&candidate, &[existing]).is_ok());
    }

    #[test]
    fn test_candidate_ignores_itself() {
        let existing = vec![published(7, PromotionSource::AfterMinTransaction, 1, 10)];
        let candidate = PublishCandidate::from(&existing[0]);
        assert!(find_source_conflict(&candidate, &existing).is_ok());
    }

    #[test]
    fn test_window_conflict_on_inventory() {
        let windows = vec![(1, at(1), at(10)), (2, at(15), at(20))];
        assert!(find_window_conflict(None, at(10), at(12), windows.clone()).is_err());
        assert!(find_window_conflict(None, at(11), at(14), windows.clone()).is_ok());
        assert!(find_window_conflict(Some(2), at(14), at(16), vec![(2, at(15), at(20))]).is_ok());
    }
}
