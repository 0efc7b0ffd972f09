//! Lending rules: loan period, borrowing limit and late fees.
//!
//! Everything here is a pure function of its inputs so the rules can be
//! checked without a catalog or ledger.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::{LibraryError, LibraryResult},
    loan::Loan,
};

/// An amount of money in cents
///
/// Serialized as a decimal number of currency units, so 350 cents is `3.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Nothing owed
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// The amount in currency units, for JSON output
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Add two amounts, saturating at the largest representable value
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    #[allow(clippy::integer_division, clippy::arithmetic_side_effects)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let units = f64::deserialize(deserializer)?;
        if !units.is_finite() || units < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid amount {units}")));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cents = (units * 100.0).round() as u64;
        Ok(Self(cents))
    }
}

/// Tunable lending rules
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// Days between borrowing and the due date
    pub loan_period_days: u64,
    /// Most books one patron may hold at once
    pub max_open_loans: usize,
    /// Fee charged for each day past the due date, in cents
    pub daily_rate_cents: u64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self { loan_period_days: 14, max_open_loans: 5, daily_rate_cents: 50 }
    }
}

impl LendingPolicy {
    /// Due date for a loan starting on `borrow_date`
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the date would overflow the
    /// calendar.
    pub fn due_date_for(&self, borrow_date: NaiveDate) -> LibraryResult<NaiveDate> {
        borrow_date.checked_add_days(Days::new(self.loan_period_days)).ok_or_else(|| {
            LibraryError::Validation(format!("Due date out of range for {borrow_date}"))
        })
    }

    /// Decide whether a patron may take one more copy of a book
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PolicyViolation` when no copy is on the shelf or
    /// the patron already holds the maximum number of books. Availability is
    /// checked first.
    pub fn check_borrow(&self, open_loans: usize, available_copies: u32) -> LibraryResult<()> {
        if available_copies == 0 {
            return Err(LibraryError::PolicyViolation(
                "This book is currently not available.".to_string(),
            ));
        }
        if open_loans >= self.max_open_loans {
            return Err(LibraryError::PolicyViolation(format!(
                "You have reached the maximum borrowing limit of {} books.",
                self.max_open_loans
            )));
        }
        Ok(())
    }

    /// Whole days past the due date
    ///
    /// A returned loan is measured up to its return date, an open one up to
    /// `as_of`. Never negative.
    #[must_use]
    pub fn days_overdue(&self, loan: &Loan, as_of: NaiveDate) -> u64 {
        let end = loan.return_date.unwrap_or(as_of);
        let late = end.signed_duration_since(loan.due_date).num_days();
        u64::try_from(late).unwrap_or(0)
    }

    /// True when the loan is open past its due date, or came back late
    #[must_use]
    pub fn is_overdue(&self, loan: &Loan, as_of: NaiveDate) -> bool {
        self.days_overdue(loan, as_of) > 0
    }

    /// Days overdue times the daily rate; zero for loans on time
    #[must_use]
    pub fn compute_late_fee(&self, loan: &Loan, as_of: NaiveDate) -> Money {
        Money(self.days_overdue(loan, as_of).saturating_mul(self.daily_rate_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patron::PatronId;

    /// Build a date from literal parts
    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    /// Loan borrowed on 2024-03-01 and due two weeks later
    fn loan(return_date: Option<NaiveDate>) -> LibraryResult<Loan> {
        Ok(Loan {
            patron_id: PatronId::parse("123456")?,
            isbn: "111".to_string(),
            borrow_date: date(2024, 3, 1),
            due_date: date(2024, 3, 15),
            return_date,
        })
    }

    #[test]
    fn due_date_adds_loan_period() -> LibraryResult<()> {
        let policy = LendingPolicy::default();
        assert_eq!(policy.due_date_for(date(2024, 2, 20))?, date(2024, 3, 5));
        Ok(())
    }

    #[test]
    fn no_fee_before_or_on_due_date() -> LibraryResult<()> {
        let policy = LendingPolicy::default();
        let open = loan(None)?;
        assert_eq!(policy.compute_late_fee(&open, date(2024, 3, 10)), Money::ZERO);
        assert_eq!(policy.compute_late_fee(&open, date(2024, 3, 15)), Money::ZERO);
        assert!(!policy.is_overdue(&open, date(2024, 3, 15)));

        let on_time = loan(Some(date(2024, 3, 15)))?;
        assert_eq!(policy.compute_late_fee(&on_time, date(2024, 6, 1)), Money::ZERO);
        assert!(!policy.is_overdue(&on_time, date(2024, 6, 1)));
        Ok(())
    }

    #[test]
    fn fee_strictly_increases_with_days_overdue() -> LibraryResult<()> {
        let policy = LendingPolicy::default();
        let open = loan(None)?;
        let mut previous = Money::ZERO;
        for offset in 1..=30 {
            let as_of = date(2024, 3, 15) + Days::new(offset);
            let fee = policy.compute_late_fee(&open, as_of);
            assert!(fee > previous, "fee must grow on day {offset}");
            assert_eq!(fee.cents(), offset * 50);
            previous = fee;
        }
        Ok(())
    }

    #[test]
    fn returned_loan_is_charged_up_to_return_date() -> LibraryResult<()> {
        let policy = LendingPolicy::default();
        let late = loan(Some(date(2024, 3, 22)))?;
        assert_eq!(policy.days_overdue(&late, date(2024, 12, 31)), 7);
        assert_eq!(policy.compute_late_fee(&late, date(2024, 12, 31)), Money::from_cents(350));
        assert!(policy.is_overdue(&late, date(2024, 12, 31)));
        Ok(())
    }

    #[test]
    fn borrow_checks_availability_before_limit() {
        let policy = LendingPolicy::default();
        assert!(policy.check_borrow(4, 1).is_ok());
        assert!(matches!(
            policy.check_borrow(5, 1),
            Err(LibraryError::PolicyViolation(msg)) if msg.contains("limit of 5")
        ));
        assert!(matches!(
            policy.check_borrow(5, 0),
            Err(LibraryError::PolicyViolation(msg)) if msg.contains("not available")
        ));
    }

    #[test]
    fn money_formats_and_serializes_as_units() -> Result<(), serde_json::Error> {
        let fee = Money::from_cents(350);
        assert_eq!(fee.to_string(), "$3.50");
        assert_eq!(serde_json::to_string(&fee)?, "3.5");
        assert_eq!(serde_json::from_str::<Money>("7.25")?, Money::from_cents(725));
        Ok(())
    }
}
