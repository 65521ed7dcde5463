//! EDTF-like date grammar
//!
//!     Dates are written in a small extended date/time grammar:
//!
//!         ?                   unknown
//!         1850                year
//!         1850-06             year and month
//!         1850-06-14          full date
//!         1850-22             season (21 spring, 22 summer, 23 autumn, 24 winter)
//!         1850~ 1850? 1850%   approximate, uncertain, both
//!         ..1850  1850..      open-ended before / after
//!         1850..1860          interval
//!         [1850..1860]        bracketed range (one of the values in between)
//!
//!     The grammar is built with chumsky combinators over characters. Calendar checks
//!     (month range, day count including leap years, no day on a season) happen in
//!     `try_map` so they surface as regular parse errors.

use chumsky::prelude::*;
use std::fmt;
use std::ops::Range;

type DateError = Simple<char>;

/// Value used when no birth year can be extracted; sorts after every real year.
pub const UNKNOWN_YEAR: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Approximate,
    Uncertain,
    ApproximateUncertain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePoint {
    pub year: u32,
    /// 1-12 for months, 21-24 for seasons.
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub qualifier: Option<Qualifier>,
}

impl DatePoint {
    pub fn season(&self) -> Option<Season> {
        match self.month? {
            21 => Some(Season::Spring),
            22 => Some(Season::Summer),
            23 => Some(Season::Autumn),
            24 => Some(Season::Winter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdtfDate {
    Unknown,
    Point(DatePoint),
    Range {
        start: Option<DatePoint>,
        end: Option<DatePoint>,
        bracketed: bool,
    },
}

/// A date slot that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    pub input: String,
    pub reason: String,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for DateParseError {}

/// Parse a date slot.
pub fn parse_date(text: &str) -> Result<EdtfDate, DateParseError> {
    date_parser().parse(text).map_err(|errors| DateParseError {
        input: text.to_string(),
        reason: errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unrecognized date".to_string()),
    })
}

/// Sortable birth indicator: the leading 4-digit year, or [`UNKNOWN_YEAR`].
pub fn leading_year(text: &str) -> u32 {
    let digits = text.trim_start_matches(|c: char| !c.is_ascii_digit());
    let year: String = digits.chars().take(4).collect();
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        year.parse().unwrap_or(UNKNOWN_YEAR)
    } else {
        UNKNOWN_YEAR
    }
}

pub fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn date_parser() -> impl Parser<char, EdtfDate, Error = DateError> {
    let unknown = just('?').then_ignore(end()).to(EdtfDate::Unknown);

    let bounds = point()
        .or_not()
        .then_ignore(just(".."))
        .then(point().or_not());

    let bracketed = just('[')
        .ignore_then(bounds.clone())
        .then_ignore(just(']'))
        .then_ignore(end())
        .try_map(|(from, to), span| range(from, to, true, span));

    let open = bounds
        .then_ignore(end())
        .try_map(|(from, to), span| range(from, to, false, span));

    let single = point().then_ignore(end()).map(EdtfDate::Point);

    choice((unknown, bracketed, open, single))
}

fn range(
    start: Option<DatePoint>,
    end: Option<DatePoint>,
    bracketed: bool,
    span: Range<usize>,
) -> Result<EdtfDate, DateError> {
    if start.is_none() && end.is_none() {
        return Err(Simple::custom(span, "a range needs at least one bound"));
    }
    Ok(EdtfDate::Range {
        start,
        end,
        bracketed,
    })
}

fn point() -> impl Parser<char, DatePoint, Error = DateError> + Clone {
    let month_day = just('-')
        .ignore_then(digits(2))
        .then(just('-').ignore_then(digits(2)).or_not());

    digits(4)
        .then(month_day.or_not())
        .then(qualifier().or_not())
        .try_map(|((year, month_day), qualifier), span| {
            let (month, day) = match month_day {
                Some((month, day)) => (Some(month), day),
                None => (None, None),
            };
            check_calendar(year, month, day).map_err(|reason| Simple::custom(span, reason))?;
            Ok(DatePoint {
                year,
                month,
                day,
                qualifier,
            })
        })
}

fn qualifier() -> impl Parser<char, Qualifier, Error = DateError> + Clone {
    choice((
        just('~').to(Qualifier::Approximate),
        just('?').to(Qualifier::Uncertain),
        just('%').to(Qualifier::ApproximateUncertain),
    ))
}

fn digits(count: usize) -> impl Parser<char, u32, Error = DateError> + Clone {
    filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .exactly(count)
        .map(|digits: Vec<char>| {
            digits
                .iter()
                .fold(0, |acc, digit| acc * 10 + digit.to_digit(10).unwrap_or(0))
        })
}

fn check_calendar(year: u32, month: Option<u32>, day: Option<u32>) -> Result<(), String> {
    let Some(month) = month else {
        return Ok(());
    };
    match (month, day) {
        (21..=24, None) => Ok(()),
        (21..=24, Some(_)) => Err(format!("season {month} cannot have a day")),
        (1..=12, None) => Ok(()),
        (1..=12, Some(day)) => {
            let max = days_in_month(year, month);
            if (1..=max).contains(&day) {
                Ok(())
            } else {
                Err(format!("day {day:02} is out of range for {year:04}-{month:02}"))
            }
        }
        _ => Err(format!("month {month:02} is out of range")),
    }
}
