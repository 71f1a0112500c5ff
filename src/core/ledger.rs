//! Availability ledger: staged litter edits gated by lifecycle status.

use crate::domain::model::{
    AmountSlot, Dog, Litter, LitterStatus, LitterUpdate, PuppyAmount, PuppyAmounts,
};
use crate::domain::ports::{ContentRepository, SessionContext};
use crate::utils::error::{RegistryError, Result};
use chrono::NaiveDate;
use std::fmt;
use tracing::{error, info, warn};

/// Litters above this many puppies in total get a warning.
pub const LITTER_SIZE_WARNING_THRESHOLD: i64 = 15;

fn saturate(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}

impl PuppyAmount {
    /// Sets the total, never below zero, pulling `available` down with it.
    pub fn with_total(self, total: i64) -> Self {
        let total = saturate(total);
        Self {
            total,
            available: self.available.clamp(0, total),
        }
    }

    /// Sets `available` within `0..=total`.
    pub fn with_available(self, available: i64) -> Self {
        Self {
            total: self.total,
            available: saturate(available).min(self.total.max(0)),
        }
    }

    /// Both rules applied in submission order.
    pub fn normalized(total: i64, available: i64) -> Self {
        PuppyAmount::default()
            .with_total(total)
            .with_available(available)
    }

    pub fn is_consistent(&self) -> bool {
        self.total >= 0 && self.available >= 0 && self.available <= self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Status,
    Mother,
    StuntDog,
    PlannedDateOfBirth,
    ExpectedDateOfBirth,
    DateOfBirth,
    PuppyAmounts,
    StatusMessage,
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditableField::Status => "status",
            EditableField::Mother => "mother",
            EditableField::StuntDog => "stunt dog",
            EditableField::PlannedDateOfBirth => "planned date of birth",
            EditableField::ExpectedDateOfBirth => "expected date of birth",
            EditableField::DateOfBirth => "date of birth",
            EditableField::PuppyAmounts => "puppy amounts",
            EditableField::StatusMessage => "status message",
        };
        f.write_str(name)
    }
}

/// Fields a litter in `status` accepts edits for.
pub fn editable_fields(status: LitterStatus) -> &'static [EditableField] {
    use EditableField::*;
    match status {
        LitterStatus::Planned => &[
            Status,
            Mother,
            StuntDog,
            PlannedDateOfBirth,
            StatusMessage,
        ],
        LitterStatus::Mated => &[Status, ExpectedDateOfBirth, StatusMessage],
        LitterStatus::Littered => &[Status, DateOfBirth, PuppyAmounts, StatusMessage],
        LitterStatus::Closed => &[],
    }
}

pub fn is_editable(status: LitterStatus, field: EditableField) -> bool {
    editable_fields(status).contains(&field)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountIssue {
    /// `None` for litter-wide issues.
    pub slot: Option<AmountSlot>,
    pub message: String,
}

impl fmt::Display for AmountIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{}: {}", slot, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountReport {
    pub errors: Vec<AmountIssue>,
    pub warnings: Vec<AmountIssue>,
}

impl AmountReport {
    /// Errors block saving, warnings do not.
    pub fn is_blocking(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Re-checks the six slots before submission.
pub fn validate_amounts(amounts: &PuppyAmounts) -> AmountReport {
    let mut report = AmountReport::default();

    for (slot, amount) in amounts.iter() {
        if amount.total < 0 {
            report.errors.push(AmountIssue {
                slot: Some(slot),
                message: format!("total must not be negative (got {})", amount.total),
            });
        }
        if amount.available < 0 {
            report.errors.push(AmountIssue {
                slot: Some(slot),
                message: format!("available must not be negative (got {})", amount.available),
            });
        }
        if amount.available > amount.total {
            report.errors.push(AmountIssue {
                slot: Some(slot),
                message: format!(
                    "available ({}) exceeds total ({})",
                    amount.available, amount.total
                ),
            });
        }
    }

    let total = amounts.total_puppies();
    if total > LITTER_SIZE_WARNING_THRESHOLD {
        report.warnings.push(AmountIssue {
            slot: None,
            message: format!("unusually large litter: {} puppies", total),
        });
    }

    report
}

/// A litter snapshot plus the local draft staged against it.
#[derive(Debug, Clone, PartialEq)]
pub struct LitterLedger {
    committed: Litter,
    draft: Litter,
}

impl LitterLedger {
    pub fn new(litter: Litter) -> Self {
        Self {
            draft: litter.clone(),
            committed: litter,
        }
    }

    pub fn committed(&self) -> &Litter {
        &self.committed
    }

    pub fn draft(&self) -> &Litter {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.committed != self.draft
    }

    /// Status changes are gated by the saved status so a closed litter stays
    /// closed; every other field follows the drafted status.
    fn ensure_editable(&self, field: EditableField) -> Result<()> {
        let status = match field {
            EditableField::Status => self.committed.status,
            _ => self.draft.status,
        };
        if is_editable(status, field) {
            Ok(())
        } else {
            Err(RegistryError::NotEditable {
                field: field.to_string(),
                status: status.to_string(),
            })
        }
    }

    pub fn set_status(&mut self, status: LitterStatus) -> Result<()> {
        self.ensure_editable(EditableField::Status)?;
        self.draft.status = status;
        Ok(())
    }

    pub fn set_mother(&mut self, mother: Option<Dog>) -> Result<()> {
        self.ensure_editable(EditableField::Mother)?;
        self.draft.mother = mother;
        Ok(())
    }

    pub fn set_stunt_dog(&mut self, stunt_dog: Option<Dog>) -> Result<()> {
        self.ensure_editable(EditableField::StuntDog)?;
        self.draft.stunt_dog = stunt_dog;
        Ok(())
    }

    pub fn set_planned_date_of_birth(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable(EditableField::PlannedDateOfBirth)?;
        self.draft.planned_date_of_birth = date;
        Ok(())
    }

    pub fn set_expected_date_of_birth(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable(EditableField::ExpectedDateOfBirth)?;
        self.draft.expected_date_of_birth = date;
        Ok(())
    }

    pub fn set_date_of_birth(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable(EditableField::DateOfBirth)?;
        self.draft.date_of_birth = date;
        Ok(())
    }

    pub fn set_status_message(&mut self, message: Option<String>) -> Result<()> {
        self.ensure_editable(EditableField::StatusMessage)?;
        self.draft.status_message_dirty = message != self.committed.status_message;
        self.draft.status_message_draft = message;
        Ok(())
    }

    pub fn set_total(&mut self, slot: AmountSlot, total: i64) -> Result<PuppyAmount> {
        self.ensure_editable(EditableField::PuppyAmounts)?;
        let amount = self.draft.amounts.get_mut(slot);
        *amount = amount.with_total(total);
        Ok(*amount)
    }

    pub fn set_available(&mut self, slot: AmountSlot, available: i64) -> Result<PuppyAmount> {
        self.ensure_editable(EditableField::PuppyAmounts)?;
        let amount = self.draft.amounts.get_mut(slot);
        *amount = amount.with_available(available);
        Ok(*amount)
    }

    pub fn validate(&self) -> AmountReport {
        validate_amounts(&self.draft.amounts)
    }

    /// All six slots plus the fields the drafted status allows.
    pub fn to_update(&self) -> LitterUpdate {
        let draft = &self.draft;
        let allowed = |field| is_editable(draft.status, field);

        let mut update = LitterUpdate {
            status: draft.status,
            amounts: draft.amounts,
            ..Default::default()
        };
        if allowed(EditableField::StatusMessage) {
            update.status_message_draft =
                Some(draft.status_message_draft.clone().unwrap_or_default());
        }
        if allowed(EditableField::Mother) {
            update.mother_id = Some(draft.mother.as_ref().map(|d| d.id.clone()));
        }
        if allowed(EditableField::StuntDog) {
            update.stunt_dog_id = Some(draft.stunt_dog.as_ref().map(|d| d.id.clone()));
        }
        if allowed(EditableField::PlannedDateOfBirth) {
            update.planned_date_of_birth = Some(draft.planned_date_of_birth);
        }
        if allowed(EditableField::ExpectedDateOfBirth) {
            update.expected_date_of_birth = Some(draft.expected_date_of_birth);
        }
        if allowed(EditableField::DateOfBirth) {
            update.date_of_birth = Some(draft.date_of_birth);
        }
        update
    }

    /// Drops staged edits.
    pub fn discard(&mut self) {
        self.draft = self.committed.clone();
    }

    /// Sends the draft as one update. On success both copies become the
    /// repository's post-write litter; on failure the draft is reset to the
    /// last committed values.
    pub async fn save<R>(&mut self, repo: &R, session: &SessionContext) -> Result<Litter>
    where
        R: ContentRepository + ?Sized,
    {
        let report = self.validate();
        for warning in &report.warnings {
            warn!(litter = %self.committed.id, "{}", warning);
        }
        if report.is_blocking() {
            let message = report
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            error!(litter = %self.committed.id, "Refusing to save litter: {}", message);
            return Err(RegistryError::ValidationError { message });
        }

        let update = self.to_update();
        match repo.update_litter(&self.committed.id, &update, session).await {
            Ok(saved) => {
                info!(litter = %saved.id, status = %saved.status, "Litter saved");
                self.committed = saved.clone();
                self.draft = saved.clone();
                Ok(saved)
            }
            Err(e) => {
                error!(litter = %self.committed.id, "Litter update rejected: {}", e);
                self.discard();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilterRequest;
    use crate::domain::model::{Article, Breeder, Color, Page, Sex};
    use async_trait::async_trait;

    const RS: AmountSlot = AmountSlot::new(Sex::Male, Color::Black);
    const HB: AmountSlot = AmountSlot::new(Sex::Female, Color::Blond);

    struct RejectingRepository;

    #[async_trait]
    impl ContentRepository for RejectingRepository {
        async fn search_dogs(&self, _: &FilterRequest, _: &SessionContext) -> Result<Page<Dog>> {
            unimplemented!()
        }

        async fn search_litters(
            &self,
            _: &FilterRequest,
            _: &SessionContext,
        ) -> Result<Page<Litter>> {
            unimplemented!()
        }

        async fn search_breeders(
            &self,
            _: &FilterRequest,
            _: &SessionContext,
        ) -> Result<Page<Breeder>> {
            unimplemented!()
        }

        async fn list_articles(&self, _: &FilterRequest, _: &SessionContext) -> Result<Vec<Article>> {
            unimplemented!()
        }

        async fn find_dog(&self, _: &str, _: &SessionContext) -> Result<Option<Dog>> {
            Ok(None)
        }

        async fn find_litter(&self, _: &str, _: &SessionContext) -> Result<Option<Litter>> {
            Ok(None)
        }

        async fn update_litter(
            &self,
            _: &str,
            _: &LitterUpdate,
            _: &SessionContext,
        ) -> Result<Litter> {
            Err(RegistryError::QueryError {
                message: "Forbidden".to_string(),
            })
        }
    }

    fn littered() -> Litter {
        Litter {
            id: "l1".to_string(),
            status: LitterStatus::Littered,
            ..Default::default()
        }
    }

    #[test]
    fn test_available_clamped_to_total() {
        assert_eq!(PuppyAmount::normalized(3, 5), PuppyAmount::new(3, 3));
        assert_eq!(PuppyAmount::normalized(-2, 1), PuppyAmount::new(0, 0));
        assert_eq!(PuppyAmount::new(4, 4).with_total(2), PuppyAmount::new(2, 2));
        assert_eq!(PuppyAmount::new(4, 1).with_available(-7), PuppyAmount::new(4, 0));
    }

    #[test]
    fn test_clamp_is_idempotent_and_consistent() {
        for total in -3..=6 {
            for available in -3..=8 {
                let once = PuppyAmount::normalized(total, available);
                let twice = once.with_total(total).with_available(available);
                assert_eq!(once, twice, "({total}, {available})");
                assert!(once.is_consistent(), "({total}, {available})");
            }
        }
        assert_eq!(PuppyAmount::default().with_total(i64::MAX).total, i32::MAX);
    }

    #[test]
    fn test_large_litter_warns_but_does_not_block() {
        let mut amounts = PuppyAmounts::default();
        amounts.male_black = PuppyAmount::new(9, 2);
        amounts.female_blond = PuppyAmount::new(7, 7);

        let report = validate_amounts(&amounts);
        assert!(!report.is_blocking());
        assert_eq!(report.warnings.len(), 1);

        amounts.female_blond = PuppyAmount::new(1, 2);
        let report = validate_amounts(&amounts);
        assert!(report.is_blocking());
        assert_eq!(report.errors[0].slot, Some(HB));
    }

    #[test]
    fn test_puppy_counts_gated_by_status() {
        for status in [LitterStatus::Planned, LitterStatus::Mated, LitterStatus::Closed] {
            let mut ledger = LitterLedger::new(Litter {
                status,
                ..Default::default()
            });
            assert!(matches!(
                ledger.set_total(RS, 3),
                Err(RegistryError::NotEditable { .. })
            ));
            assert!(!ledger.is_dirty());
        }

        let mut ledger = LitterLedger::new(littered());
        ledger.set_total(RS, 3).unwrap();
        assert_eq!(ledger.set_available(RS, 5).unwrap(), PuppyAmount::new(3, 3));
        assert!(ledger.set_planned_date_of_birth(None).is_err());
    }

    #[test]
    fn test_closed_litter_cannot_be_reopened() {
        let mut ledger = LitterLedger::new(Litter {
            status: LitterStatus::Closed,
            ..Default::default()
        });
        assert!(ledger.set_status(LitterStatus::Littered).is_err());
        assert!(ledger.set_status_message(Some("hi".to_string())).is_err());

        let mut ledger = LitterLedger::new(littered());
        ledger.set_status(LitterStatus::Closed).unwrap();
        assert!(ledger.set_total(RS, 1).is_err());
    }

    #[test]
    fn test_update_carries_status_appropriate_fields() {
        let mut ledger = LitterLedger::new(Litter {
            status: LitterStatus::Mated,
            planned_date_of_birth: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        });
        ledger
            .set_expected_date_of_birth(NaiveDate::from_ymd_opt(2025, 3, 9))
            .unwrap();

        let update = ledger.to_update();
        assert_eq!(
            update.expected_date_of_birth,
            Some(NaiveDate::from_ymd_opt(2025, 3, 9))
        );
        assert_eq!(update.planned_date_of_birth, None);
        assert_eq!(update.status_message_draft.as_deref(), Some(""));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["LitterStatus"], "Manted");
        assert_eq!(json["AmountRS"]["Total"], 0);
        assert!(json.get("plannedDateOfBirth").is_none());
    }

    #[test]
    fn test_cleared_field_is_sent_as_null() {
        let mut ledger = LitterLedger::new(Litter {
            status: LitterStatus::Planned,
            mother: Some(Dog {
                id: "d1".to_string(),
                ..Default::default()
            }),
            planned_date_of_birth: NaiveDate::from_ymd_opt(2025, 5, 1),
            ..Default::default()
        });
        ledger.set_mother(None).unwrap();
        ledger.set_planned_date_of_birth(None).unwrap();

        let update = ledger.to_update();
        assert_eq!(update.mother_id, Some(None));
        assert_eq!(update.planned_date_of_birth, Some(None));
        assert_eq!(update.date_of_birth, None);

        let json = serde_json::to_value(&update).unwrap();
        assert!(json["mother"].is_null());
        assert!(json["plannedDateOfBirth"].is_null());
        assert!(json.get("dateOfBirth").is_none());
    }

    #[tokio::test]
    async fn test_failed_save_restores_committed_values() {
        let mut ledger = LitterLedger::new(littered());
        ledger.set_total(RS, 4).unwrap();
        assert!(ledger.is_dirty());

        let err = ledger
            .save(&RejectingRepository, &SessionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.message().as_deref(), Some("Forbidden"));
        assert!(!ledger.is_dirty());
        assert_eq!(ledger.draft().amounts.get(RS), PuppyAmount::default());
    }
}
