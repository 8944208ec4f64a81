//! # skillcast-calendar
//!
//! Month-resolution date arithmetic on the proleptic Gregorian calendar.
//!
//! Seasonal hindcasts are issued on the first of a month and predict whole
//! target months, so the only date type the rest of the workspace needs is
//! a `(year, month)` pair that can be advanced by a lead time and asked for
//! its length.
//!
//! ## Quick Start
//!
//! ```ignore
//! use skillcast_calendar::YearMonth;
//!
//! let start = YearMonth::new(2015, 11).unwrap();
//! let target = start.add_months(3); // Feb 2016
//! assert_eq!(target.days_in_month(), 29);
//!
//! let tag = YearMonth::parse_tag("202512").unwrap();
//! assert_eq!(tag.month(), 12);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `year_month` | `YearMonth` value type, month lengths, file-name tags |
//! | `error` | Error types |

mod error;
mod year_month;

pub use error::CalendarError;
pub use year_month::{MONTH_LABELS, YearMonth, days_in_month, is_leap_year, month_label};
