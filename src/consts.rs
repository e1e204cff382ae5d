/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
pub const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
pub(crate) const CENTURY_CYCLE: u16 = 100;
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Date component separator (`YYYY-MM-DD`)
pub const DATE_SEPARATOR: char = '-';

/// Separates the date from a time part in timestamps handed over by the host
/// platform (`2026-07-01T00:00:00Z`).
pub const TIME_SEPARATOR: char = 'T';

/// Separator used when displaying a linked pair (`day-1+day-2`)
pub const PAIR_SEPARATOR: char = '+';
