use crate::models::Booking;
use chrono::NaiveDate;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Invalid booking dates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("{field} must be in YYYY-MM-DD format, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("checkout date {checkout} cannot be before booking date {booking}")]
    CheckoutBeforeBooking { booking: NaiveDate, checkout: NaiveDate },
}

/// Days occupied by a stay, as a half-open range `[start, end)`
///
/// A same-day stay occupies its single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    pub booking_date: NaiveDate,
    pub checkout_date: NaiveDate,
}

impl StayRange {
    pub fn new(booking_date: NaiveDate, checkout_date: NaiveDate) -> Result<Self, BookingError> {
        if checkout_date < booking_date {
            return Err(BookingError::CheckoutBeforeBooking {
                booking: booking_date,
                checkout: checkout_date,
            });
        }
        Ok(Self { booking_date, checkout_date })
    }

    /// Parse `YYYY-MM-DD` booking and checkout dates
    pub fn parse(booking_date: &str, checkout_date: &str) -> Result<Self, BookingError> {
        let booking = parse_date("booking_date", booking_date)?;
        let checkout = parse_date("checkout_date", checkout_date)?;
        Self::new(booking, checkout)
    }

    fn end(&self) -> NaiveDate {
        if self.checkout_date == self.booking_date {
            self.booking_date.succ_opt().unwrap_or(self.checkout_date)
        } else {
            self.checkout_date
        }
    }

    #[inline]
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.booking_date < other.end() && other.booking_date < self.end()
    }
}

impl From<&Booking> for StayRange {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_date: booking.booking_date,
            checkout_date: booking.checkout_date,
        }
    }
}

/// First existing booking whose stay overlaps `stay`
pub fn find_conflict<'a>(stay: &StayRange, existing: &'a [Booking]) -> Option<&'a Booking> {
    existing
        .iter()
        .find(|booking| stay.overlaps(&StayRange::from(*booking)))
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| BookingError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn booking(id: i64, from: &str, to: &str) -> Booking {
        Booking {
            id,
            property_id: 1,
            user_id: 1,
            booking_date: date(from),
            booking_time: "14:00".to_string(),
            checkout_date: date(to),
            checkout_time: "10:00".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_parse_valid() {
        let stay = StayRange::parse("2025-03-01", "2025-03-04").unwrap();
        assert_eq!(stay.booking_date, date("2025-03-01"));
        assert_eq!(stay.checkout_date, date("2025-03-04"));
    }

    #[test]
    fn test_parse_bad_format() {
        let err = StayRange::parse("03/01/2025", "2025-03-04").unwrap_err();
        assert!(matches!(err, BookingError::InvalidDate { field: "booking_date", .. }));
    }

    #[test]
    fn test_checkout_before_booking() {
        let err = StayRange::parse("2025-03-04", "2025-03-01").unwrap_err();
        assert!(matches!(err, BookingError::CheckoutBeforeBooking { .. }));
    }

    #[test]
    fn test_back_to_back_stays_do_not_conflict() {
        let existing = vec![booking(1, "2025-03-01", "2025-03-04")];
        let stay = StayRange::parse("2025-03-04", "2025-03-06").unwrap();
        assert!(find_conflict(&stay, &existing).is_none());
    }

    #[test]
    fn test_overlapping_stays_conflict() {
        let existing = vec![
            booking(1, "2025-02-01", "2025-02-03"),
            booking(2, "2025-03-01", "2025-03-04"),
        ];
        let stay = StayRange::parse("2025-03-03", "2025-03-06").unwrap();
        assert_eq!(find_conflict(&stay, &existing).map(|b| b.id), Some(2));
    }

    #[test]
    fn test_same_day_stays() {
        let existing = vec![booking(1, "2025-03-01", "2025-03-01")];

        let same_day = StayRange::parse("2025-03-01", "2025-03-01").unwrap();
        assert!(find_conflict(&same_day, &existing).is_some());

        let next_day = StayRange::parse("2025-03-02", "2025-03-02").unwrap();
        assert!(find_conflict(&next_day, &existing).is_none());
    }

    #[test]
    fn test_same_start_date_conflicts() {
        let existing = vec![booking(1, "2025-03-01", "2025-03-10")];
        let stay = StayRange::parse("2025-03-01", "2025-03-01").unwrap();
        assert!(find_conflict(&stay, &existing).is_some());
    }
}
