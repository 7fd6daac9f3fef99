use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One price tier of the commission schedule.
///
/// Matches any supplier price strictly below `upper_bound`; `None` is the
/// open-ended top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBracket {
    pub upper_bound: Option<Decimal>,
    pub rate_percent: Decimal,
}

impl CommissionBracket {
    pub fn below(upper_bound: Decimal, rate_percent: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate_percent,
        }
    }

    pub fn open_ended(rate_percent: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate_percent,
        }
    }

    pub fn matches(&self, price: Decimal) -> bool {
        match self.upper_bound {
            Some(bound) => bound > price,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("commission schedule is empty")]
    Empty,
    #[error("bracket {index} has upper bound {bound}, not above the previous bound")]
    NotAscending { index: usize, bound: Decimal },
    #[error("bracket {index} has no upper bound but is not the last bracket")]
    OpenEndedNotLast { index: usize },
    #[error("last bracket must be open-ended")]
    NotExhaustive,
    #[error("bracket {index} has negative rate {rate}%")]
    NegativeRate { index: usize, rate: Decimal },
}

/// Ordered commission tiers, evaluated on the supplier price.
///
/// The first bracket whose upper bound exceeds the price wins, so a price
/// sitting exactly on a boundary falls into the next tier up.
///
/// # Examples
///
/// ```
/// use import_cost::tariff::commission::CommissionSchedule;
/// use rust_decimal_macros::dec;
///
/// let schedule = CommissionSchedule::default();
/// assert_eq!(schedule.rate_for(dec!(9.99)), Some(dec!(25)));
/// assert_eq!(schedule.rate_for(dec!(10)), Some(dec!(35)));
/// assert_eq!(schedule.rate_for(dec!(250)), Some(dec!(25)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionSchedule {
    brackets: Vec<CommissionBracket>,
}

impl CommissionSchedule {
    /// Build and validate a schedule.
    pub fn new(brackets: Vec<CommissionBracket>) -> Result<Self, ScheduleError> {
        let schedule = Self { brackets };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check that bounds are strictly ascending and the schedule ends with
    /// an open-ended bracket.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }
        let last = self.brackets.len() - 1;
        let mut previous = Decimal::ZERO;
        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate_percent < Decimal::ZERO {
                return Err(ScheduleError::NegativeRate {
                    index,
                    rate: bracket.rate_percent,
                });
            }
            match bracket.upper_bound {
                Some(bound) => {
                    if bound <= previous {
                        return Err(ScheduleError::NotAscending { index, bound });
                    }
                    previous = bound;
                }
                None if index != last => return Err(ScheduleError::OpenEndedNotLast { index }),
                None => {}
            }
        }
        if self.brackets[last].upper_bound.is_some() {
            return Err(ScheduleError::NotExhaustive);
        }
        Ok(())
    }

    /// First bracket whose upper bound exceeds `price`.
    pub fn bracket_for(&self, price: Decimal) -> Option<&CommissionBracket> {
        self.brackets.iter().find(|b| b.matches(price))
    }

    pub fn rate_for(&self, price: Decimal) -> Option<Decimal> {
        self.bracket_for(price).map(|b| b.rate_percent)
    }

    pub fn brackets(&self) -> &[CommissionBracket] {
        &self.brackets
    }
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self {
            brackets: vec![
                CommissionBracket::below(dec!(10), dec!(25)),
                CommissionBracket::below(dec!(25), dec!(35)),
                CommissionBracket::below(dec!(100), dec!(38)),
                CommissionBracket::below(dec!(200), dec!(30)),
                CommissionBracket::open_ended(dec!(25)),
            ],
        }
    }
}

impl fmt::Display for CommissionSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lower = Decimal::ZERO;
        for bracket in &self.brackets {
            match bracket.upper_bound {
                Some(upper) => {
                    writeln!(f, "  [{}, {})  {}%", lower, upper, bracket.rate_percent)?;
                    lower = upper;
                }
                None => writeln!(f, "  [{}, +inf)  {}%", lower, bracket.rate_percent)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_is_valid() {
        assert!(CommissionSchedule::default().validate().is_ok());
    }

    #[test]
    fn test_boundaries_fall_into_next_tier() {
        let schedule = CommissionSchedule::default();
        assert_eq!(schedule.rate_for(dec!(9.999)), Some(dec!(25)));
        assert_eq!(schedule.rate_for(dec!(10.000)), Some(dec!(35)));
        assert_eq!(schedule.rate_for(dec!(10.001)), Some(dec!(35)));
        assert_eq!(schedule.rate_for(dec!(25)), Some(dec!(38)));
        assert_eq!(schedule.rate_for(dec!(99.99)), Some(dec!(38)));
        assert_eq!(schedule.rate_for(dec!(100)), Some(dec!(30)));
        assert_eq!(schedule.rate_for(dec!(199.99)), Some(dec!(30)));
        assert_eq!(schedule.rate_for(dec!(200)), Some(dec!(25)));
    }

    #[test]
    fn test_empty_schedule() {
        assert_eq!(CommissionSchedule::new(vec![]), Err(ScheduleError::Empty));
    }

    #[test]
    fn test_not_exhaustive() {
        let result = CommissionSchedule::new(vec![CommissionBracket::below(dec!(10), dec!(25))]);
        assert_eq!(result, Err(ScheduleError::NotExhaustive));
    }

    #[test]
    fn test_descending_bounds_rejected() {
        let result = CommissionSchedule::new(vec![
            CommissionBracket::below(dec!(25), dec!(35)),
            CommissionBracket::below(dec!(10), dec!(25)),
            CommissionBracket::open_ended(dec!(25)),
        ]);
        assert!(matches!(result, Err(ScheduleError::NotAscending { index: 1, .. })));
    }

    #[test]
    fn test_open_ended_in_middle_rejected() {
        let result = CommissionSchedule::new(vec![
            CommissionBracket::open_ended(dec!(25)),
            CommissionBracket::open_ended(dec!(30)),
        ]);
        assert_eq!(result, Err(ScheduleError::OpenEndedNotLast { index: 0 }));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = CommissionSchedule::new(vec![CommissionBracket::open_ended(dec!(-1))]);
        assert!(matches!(result, Err(ScheduleError::NegativeRate { .. })));
    }

    #[test]
    fn test_unvalidated_schedule_can_miss() {
        // Deserialized schedules skip validation until asked.
        let schedule: CommissionSchedule =
            serde_json::from_str(r#"[{ "upper_bound": "10", "rate_percent": "25" }]"#).unwrap();
        assert_eq!(schedule.bracket_for(dec!(50)), None);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_display_lists_ranges() {
        let text = CommissionSchedule::default().to_string();
        assert!(text.contains("[0, 10)  25%"));
        assert!(text.contains("[200, +inf)  25%"));
    }
}
