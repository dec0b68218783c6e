//! Reporting-period resolution: month names and financial-year strings.

use chrono::NaiveDate;

/// One calendar month and the two spellings the upstream feed uses for it.
#[derive(Debug, Clone, Copy)]
struct MonthName {
  number: u32,
  short:  &'static str,
  long:   &'static str,
}

const MONTHS: [MonthName; 12] = [
  MonthName { number: 1, short: "Jan", long: "January" },
  MonthName { number: 2, short: "Feb", long: "February" },
  MonthName { number: 3, short: "Mar", long: "March" },
  MonthName { number: 4, short: "Apr", long: "April" },
  MonthName { number: 5, short: "May", long: "May" },
  MonthName { number: 6, short: "Jun", long: "June" },
  MonthName { number: 7, short: "Jul", long: "July" },
  MonthName { number: 8, short: "Aug", long: "August" },
  MonthName { number: 9, short: "Sep", long: "September" },
  MonthName { number: 10, short: "Oct", long: "October" },
  MonthName { number: 11, short: "Nov", long: "November" },
  MonthName { number: 12, short: "Dec", long: "December" },
];

// A spelling shared by two different months would make the lookup
// ambiguous; reject that at compile time.
const _: () = assert!(spellings_are_unique(&MONTHS), "month spelling listed twice");

const fn str_eq(a: &str, b: &str) -> bool {
  let (a, b) = (a.as_bytes(), b.as_bytes());
  if a.len() != b.len() {
    return false;
  }
  let mut i = 0;
  while i < a.len() {
    if a[i] != b[i] {
      return false;
    }
    i += 1;
  }
  true
}

const fn spellings_are_unique(months: &[MonthName]) -> bool {
  let mut i = 0;
  while i < months.len() {
    let mut j = i + 1;
    while j < months.len() {
      let (x, y) = (&months[i], &months[j]);
      if x.number == y.number
        || str_eq(x.short, y.short)
        || str_eq(x.short, y.long)
        || str_eq(x.long, y.short)
        || str_eq(x.long, y.long)
      {
        return false;
      }
      j += 1;
    }
    i += 1;
  }
  true
}

/// Month number (1-12) for an exact, case-sensitive month name. Both the
/// three-letter abbreviation and the full English name are accepted.
pub fn month_number(name: &str) -> Option<u32> {
  MONTHS
    .iter()
    .find(|m| m.short == name || m.long == name)
    .map(|m| m.number)
}

/// The calendar year a `YYYY-YY` financial-year string starts in.
///
/// Only the four-digit prefix is significant; the suffix after the dash is
/// not checked.
pub fn financial_year_start(fin_year: &str) -> Option<i32> {
  let prefix = fin_year.trim().split('-').next()?;
  if prefix.len() != 4 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  prefix.parse().ok()
}

/// The first day of the reporting month, if `year`/`month` form a valid
/// date.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)
}
