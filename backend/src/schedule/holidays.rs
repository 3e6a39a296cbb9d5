//! Public holiday calendar
//!
//! The simulated year starts on a Monday January 1st. Holidays thin out the
//! staffing schedule (fewer planned operations, reduced intake). The dates
//! are the Dutch public holidays of that reference year, expressed as day
//! indices from the start of the simulation; horizons longer than a year
//! repeat the calendar.

/// Day indices (0-based) of public holidays within the reference year.
const HOLIDAY_DAYS: [usize; 11] = [
    0,   // New Year's Day (Mon Jan 1)
    88,  // Good Friday (Fri Mar 30)
    90,  // Easter Day (Sun Apr 1)
    91,  // Easter Monday (Mon Apr 2)
    116, // King's Day (Fri Apr 27)
    124, // Liberation Day (Sat May 5)
    129, // Ascension Day (Thu May 10)
    139, // Pentecost Sunday (Sun May 20)
    140, // Whit Monday (Mon May 21)
    358, // Christmas Day (Tue Dec 25)
    359, // Boxing Day (Wed Dec 26)
];

const DAYS_PER_YEAR: usize = 365;

/// True if the given simulation day falls on a public holiday.
pub fn is_holiday(day: usize) -> bool {
    HOLIDAY_DAYS.contains(&(day % DAYS_PER_YEAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_year_is_holiday() {
        assert!(is_holiday(0));
    }

    #[test]
    fn test_christmas_is_holiday() {
        assert!(is_holiday(358));
        assert!(is_holiday(359));
    }

    #[test]
    fn test_ordinary_day_is_not() {
        assert!(!is_holiday(1));
        assert!(!is_holiday(200));
    }

    #[test]
    fn test_calendar_repeats_yearly() {
        assert!(is_holiday(365));
        assert!(is_holiday(365 + 88));
        assert!(!is_holiday(365 + 1));
    }
}
