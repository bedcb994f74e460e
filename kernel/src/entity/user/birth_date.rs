use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

/// Minimum age, in completed years, required to rent an adults-only movie.
pub const LEGAL_RENTAL_AGE: i32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct UserBirthDate(Date);

impl UserBirthDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    /// Age in completed years on the given day, birthday counted inclusively.
    pub fn age_at(&self, on: Date) -> i32 {
        let mut age = on.year() - self.0.year();
        if (on.month() as u8, on.day()) < (self.0.month() as u8, self.0.day()) {
            age -= 1;
        }
        age
    }

    pub fn is_of_legal_age(&self, on: Date) -> bool {
        self.age_at(on) >= LEGAL_RENTAL_AGE
    }
}

#[cfg(test)]
mod test {
    use time::{Date, Month};

    use super::UserBirthDate;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    #[test]
    fn counts_completed_years_only() {
        let birth = UserBirthDate::new(date(2000, Month::June, 15));
        assert_eq!(birth.age_at(date(2018, Month::June, 14)), 17);
        assert_eq!(birth.age_at(date(2018, Month::June, 15)), 18);
        assert_eq!(birth.age_at(date(2019, Month::January, 1)), 18);
    }

    #[test]
    fn legal_age_turns_on_the_birthday() {
        let birth = UserBirthDate::new(date(2000, Month::June, 15));
        assert!(!birth.is_of_legal_age(date(2018, Month::June, 14)));
        assert!(birth.is_of_legal_age(date(2018, Month::June, 15)));
    }

    #[test]
    fn leap_day_birth_waits_for_march() {
        let birth = UserBirthDate::new(date(2004, Month::February, 29));
        assert!(!birth.is_of_legal_age(date(2022, Month::February, 28)));
        assert!(birth.is_of_legal_age(date(2022, Month::March, 1)));
    }
}
