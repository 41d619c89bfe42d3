//! Rule-based public holiday calendars.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Shift a fixed-date holiday that lands on a weekend to the observed weekday
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    (1..=7)
        .map(|back| first_of_next - Duration::days(back))
        .find(|d| d.weekday() == weekday)
}

/// US federal holidays of `year`, both the calendar date and the observed
/// weekday when a fixed-date holiday falls on a weekend.
pub fn us_federal_holidays(year: i32) -> Vec<NaiveDate> {
    let mut fixed: Vec<(u32, u32)> = vec![(1, 1), (7, 4), (11, 11), (12, 25)];
    if year >= 2021 {
        fixed.push((6, 19));
    }

    let mut days: Vec<NaiveDate> = fixed
        .into_iter()
        .filter_map(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .flat_map(|d| [d, observed(d)])
        .collect();

    days.extend(
        [
            nth_weekday(year, 1, Weekday::Mon, 3),  // Martin Luther King Jr. Day
            nth_weekday(year, 2, Weekday::Mon, 3),  // Washington's Birthday
            last_weekday(year, 5, Weekday::Mon),    // Memorial Day
            nth_weekday(year, 9, Weekday::Mon, 1),  // Labor Day
            nth_weekday(year, 10, Weekday::Mon, 2), // Columbus Day
            nth_weekday(year, 11, Weekday::Thu, 4), // Thanksgiving
        ]
        .into_iter()
        .flatten(),
    );

    days.sort();
    days.dedup();
    days
}

pub fn is_us_federal_holiday(date: NaiveDate) -> bool {
    // New Year's Day on a Saturday is observed on Dec 31 of the prior year
    us_federal_holidays(date.year()).contains(&date)
        || (date.month() == 12 && us_federal_holidays(date.year() + 1).contains(&date))
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Swedish public holidays and the customary non-working eves.
pub fn is_swedish_holiday(date: NaiveDate) -> bool {
    let fixed = matches!(
        (date.month(), date.day()),
        (1, 1)   // New Year's Day
        | (1, 6)   // Epiphany
        | (5, 1)   // Labour Day
        | (6, 6)   // National Day
        | (12, 24) // Christmas Eve
        | (12, 25) // Christmas Day
        | (12, 26) // Boxing Day
        | (12, 31) // New Year's Eve
    );
    if fixed {
        return true;
    }

    // Midsummer Eve is the Friday between 19 and 25 June, Midsummer Day the Saturday after
    let midsummer = date.month() == 6
        && ((date.weekday() == Weekday::Fri && (19..=25).contains(&date.day()))
            || (date.weekday() == Weekday::Sat && (20..=26).contains(&date.day())));
    // All Saints' Day is the Saturday between 31 October and 6 November
    let all_saints = date.weekday() == Weekday::Sat
        && ((date.month() == 10 && date.day() == 31) || (date.month() == 11 && date.day() <= 6));
    if midsummer || all_saints {
        return true;
    }

    easter_sunday(date.year()).is_some_and(|easter| {
        let offset = (date - easter).num_days();
        // Good Friday, Easter Sunday, Easter Monday, Ascension Day, Whitsunday
        matches!(offset, -2 | 0 | 1 | 39 | 49)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2013, 1, 1))]
    #[case(date(2013, 1, 21))]
    #[case(date(2013, 2, 18))]
    #[case(date(2013, 5, 27))]
    #[case(date(2013, 7, 4))]
    #[case(date(2013, 9, 2))]
    #[case(date(2013, 10, 14))]
    #[case(date(2013, 11, 11))]
    #[case(date(2013, 11, 28))]
    #[case(date(2013, 12, 25))]
    fn test_us_holidays_2013(#[case] day: NaiveDate) {
        assert!(is_us_federal_holiday(day), "{day} should be a holiday");
    }

    #[rstest]
    #[case(date(2013, 9, 18))]
    #[case(date(2013, 11, 29))]
    #[case(date(2013, 7, 5))]
    fn test_us_working_days(#[case] day: NaiveDate) {
        assert!(!is_us_federal_holiday(day));
    }

    #[test]
    fn test_observed_shift() {
        // July 4th 2015 was a Saturday, observed Friday July 3rd
        assert!(is_us_federal_holiday(date(2015, 7, 3)));
        // Christmas 2016 was a Sunday, observed Monday December 26th
        assert!(is_us_federal_holiday(date(2016, 12, 26)));
        // New Year's Day 2022 was a Saturday, observed Friday December 31st 2021
        assert!(is_us_federal_holiday(date(2021, 12, 31)));
    }

    #[test]
    fn test_juneteenth_only_from_2021() {
        assert!(!is_us_federal_holiday(date(2019, 6, 19)));
        assert!(is_us_federal_holiday(date(2023, 6, 19)));
    }

    #[rstest]
    #[case(2013, date(2013, 3, 31))]
    #[case(2019, date(2019, 4, 21))]
    #[case(2024, date(2024, 3, 31))]
    fn test_easter(#[case] year: i32, #[case] expected: NaiveDate) {
        assert_eq!(easter_sunday(year), Some(expected));
    }

    #[test]
    fn test_swedish_holidays() {
        assert!(is_swedish_holiday(date(2013, 6, 6)));
        assert!(is_swedish_holiday(date(2013, 3, 29))); // Good Friday
        assert!(is_swedish_holiday(date(2013, 6, 21))); // Midsummer Eve
        assert!(is_swedish_holiday(date(2013, 11, 2))); // All Saints' Day
        assert!(!is_swedish_holiday(date(2013, 9, 18)));
    }
}
