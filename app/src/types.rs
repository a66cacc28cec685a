//! Domain types for the cinema admin tool.
//!
//! Bookings, theaters, showtimes, and pricing. Numeric values that travel
//! as text on the wire (ticket counts, amounts, seats) are typed here and
//! validated when they cross the boundary in [`crate::codec`].

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from a `Uuid`
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a theater (screening room)
    TheaterId
);
uuid_id!(
    /// Unique identifier for a movie
    MovieId
);
uuid_id!(
    /// Unique identifier for a showtime
    ShowtimeId
);
uuid_id!(
    /// Unique identifier for a price discount
    DiscountId
);

// ============================================================================
// Value Objects
// ============================================================================

/// Error returned when a wire value does not parse into a typed field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Amount is empty, negative, or has more than two decimals
    #[error("invalid amount: {0:?}")]
    Amount(String),
    /// Seat code is not letters followed by digits
    #[error("invalid seat code: {0:?}")]
    Seat(String),
    /// Ticket type label is not recognised
    #[error("unknown ticket type: {0:?}")]
    TicketType(String),
}

/// Money amount in minor units (cents)
///
/// The wire format is a decimal string with at most two fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole units, `None` on overflow
    #[must_use]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Adds two amounts, clamping at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, flooring at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `percent` of this amount, rounded down to the cent
    #[must_use]
    pub const fn percent(self, percent: u8) -> Self {
        Self(self.0.saturating_mul(percent as u64) / 100)
    }
}

impl FromStr for Money {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::Amount(s.to_string());
        let trimmed = s.trim();

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let units: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / 100;
        let cents = self.0 % 100;
        if cents == 0 {
            write!(f, "{units}")
        } else {
            write!(f, "{units}.{cents:02}")
        }
    }
}

/// Seat code: row letters followed by a seat number (`A1`, `AB12`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatCode(String);

impl SeatCode {
    /// Parse a comma and/or whitespace separated list of seat codes
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Seat`] for the first code that is not valid.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, ValueError> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Render seats in the wire format (`A1,A2`)
    #[must_use]
    pub fn join(seats: &[Self]) -> String {
        seats
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The code as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The row letters
    #[must_use]
    pub fn row(&self) -> &str {
        self.0.trim_end_matches(|c: char| c.is_ascii_digit())
    }
}

impl FromStr for SeatCode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits_at = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (row, number) = s.split_at(digits_at);

        let valid = !row.is_empty()
            && row.bytes().all(|b| b.is_ascii_uppercase())
            && !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit());

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValueError::Seat(s.to_string()))
        }
    }
}

impl fmt::Display for SeatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Ticket type sold with a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    /// Full-price adult ticket
    Full,
    /// Student ticket
    Student,
    /// Senior ticket
    Senior,
    /// Child ticket
    Child,
}

impl TicketType {
    /// All ticket types
    pub const ALL: [Self; 4] = [Self::Full, Self::Student, Self::Senior, Self::Child];

    /// Label used in the booking sheet
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "全票",
            Self::Student => "學生票",
            Self::Senior => "敬老票",
            Self::Child => "兒童票",
        }
    }
}

impl FromStr for TicketType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == trimmed)
            .or_else(|| match trimmed.to_ascii_lowercase().as_str() {
                "full" => Some(Self::Full),
                "student" => Some(Self::Student),
                "senior" => Some(Self::Senior),
                "child" => Some(Self::Child),
                _ => None,
            })
            .ok_or_else(|| ValueError::TicketType(s.to_string()))
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reserved-ticket transaction (one row of the booking sheet)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Day the booking was made
    pub booking_date: NaiveDate,
    /// Movie title
    pub movie_name: String,
    /// Day of the screening
    pub show_date: NaiveDate,
    /// Start time of the screening
    pub show_time: NaiveTime,
    /// Number of tickets
    pub ticket_count: u32,
    /// Ticket type
    pub ticket_type: TicketType,
    /// Reserved seats
    pub seats: Vec<SeatCode>,
    /// Amount charged
    pub total_amount: Money,
}

impl BookingRecord {
    /// Whether this record is the one `other` refers to when updating
    ///
    /// A booking is identified by booking day, movie, and screening slot.
    #[must_use]
    pub fn same_booking(&self, other: &Self) -> bool {
        self.booking_date == other.booking_date
            && self.movie_name == other.movie_name
            && self.show_date == other.show_date
            && self.show_time == other.show_time
    }
}

// ============================================================================
// Theaters
// ============================================================================

/// Kind of screening room
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TheaterType {
    /// Regular room
    Standard,
    /// IMAX room
    Imax,
    /// VIP room
    Vip,
    /// 4DX motion room
    FourDx,
}

/// Operational status of a theater
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TheaterStatus {
    /// Open for screenings
    Active,
    /// Temporarily out of service
    Maintenance,
    /// Permanently closed
    Closed,
}

/// Kind of cell in a seat layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatType {
    /// Regular seat
    Normal,
    /// VIP seat
    Vip,
    /// Wheelchair-accessible seat
    Handicapped,
    /// Aisle or gap
    Empty,
}

/// Seat layout grid, row by row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLayout(pub Vec<Vec<SeatType>>);

impl SeatLayout {
    /// Uniform layout of `rows × columns` normal seats
    #[must_use]
    pub fn uniform(rows: usize, columns: usize) -> Self {
        Self(vec![vec![SeatType::Normal; columns]; rows])
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.0.len()
    }

    /// Number of cells that are actual seats
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|cell| **cell != SeatType::Empty)
            .count()
    }

    /// Number of seats of one type
    #[must_use]
    pub fn count_of(&self, seat_type: SeatType) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|cell| **cell == seat_type)
            .count()
    }
}

/// A screening room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    /// Identifier
    pub id: TheaterId,
    /// Display name
    pub name: String,
    /// Advertised seat capacity
    pub capacity: u32,
    /// Kind of room
    pub theater_type: TheaterType,
    /// Operational status
    pub status: TheaterStatus,
    /// Seat grid
    pub seat_layout: SeatLayout,
}

impl Theater {
    /// Whether the advertised capacity equals the number of seats in the layout
    ///
    /// Reported for display; not enforced.
    #[must_use]
    pub fn layout_matches_capacity(&self) -> bool {
        usize::try_from(self.capacity).is_ok_and(|c| c == self.seat_layout.seat_count())
    }
}

// ============================================================================
// Pricing
// ============================================================================

/// How a discount reduces a price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    /// Percentage off (0..=100)
    Percentage(u8),
    /// Fixed amount off
    FixedAmount(Money),
}

/// A named price adjustment with a validity window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDiscount {
    /// Identifier
    pub id: DiscountId,
    /// Display name
    pub name: String,
    /// Reduction rule
    pub kind: DiscountKind,
    /// First instant the discount applies
    pub valid_from: DateTime<Utc>,
    /// Last instant the discount applies
    pub valid_until: DateTime<Utc>,
    /// Free-form description
    pub description: String,
}

impl PriceDiscount {
    /// Whether the discount applies at `at` (inclusive on both ends)
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at <= self.valid_until
    }

    /// Amount this discount takes off `price`, never more than `price`
    #[must_use]
    pub fn reduction_for(&self, price: Money) -> Money {
        let reduction = match self.kind {
            DiscountKind::Percentage(percent) => price.percent(percent.min(100)),
            DiscountKind::FixedAmount(amount) => amount,
        };
        reduction.min(price)
    }
}

/// Price tier a ticket is charged at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    /// Base price
    Base,
    /// Weekend price
    Weekend,
    /// Holiday price
    Holiday,
    /// Student price
    Student,
    /// Senior price
    Senior,
    /// Child price
    Child,
    /// VIP seat price
    Vip,
}

impl From<TicketType> for PriceTier {
    fn from(ticket_type: TicketType) -> Self {
        match ticket_type {
            TicketType::Full => Self::Base,
            TicketType::Student => Self::Student,
            TicketType::Senior => Self::Senior,
            TicketType::Child => Self::Child,
        }
    }
}

/// Price sheet of a showtime
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimePrice {
    /// Base price
    pub base: Money,
    /// Weekend price
    pub weekend: Option<Money>,
    /// Holiday price
    pub holiday: Option<Money>,
    /// Student price
    pub student: Option<Money>,
    /// Senior price
    pub senior: Option<Money>,
    /// Child price
    pub child: Option<Money>,
    /// VIP seat price
    pub vip: Option<Money>,
    /// Discounts that may apply
    pub discounts: Vec<PriceDiscount>,
}

impl ShowtimePrice {
    /// Price sheet with only a base price
    #[must_use]
    pub const fn flat(base: Money) -> Self {
        Self {
            base,
            weekend: None,
            holiday: None,
            student: None,
            senior: None,
            child: None,
            vip: None,
            discounts: Vec::new(),
        }
    }

    /// Undiscounted price of a tier, falling back to the base price
    #[must_use]
    pub fn tier_price(&self, tier: PriceTier) -> Money {
        let price = match tier {
            PriceTier::Base => None,
            PriceTier::Weekend => self.weekend,
            PriceTier::Holiday => self.holiday,
            PriceTier::Student => self.student,
            PriceTier::Senior => self.senior,
            PriceTier::Child => self.child,
            PriceTier::Vip => self.vip,
        };
        price.unwrap_or(self.base)
    }

    /// Price of a tier at `at`, with the largest active discount applied
    ///
    /// Discounts do not stack.
    #[must_use]
    pub fn price_for(&self, tier: PriceTier, at: DateTime<Utc>) -> Money {
        let price = self.tier_price(tier);
        let best = self
            .discounts
            .iter()
            .filter(|d| d.is_active_at(at))
            .map(|d| d.reduction_for(price))
            .max()
            .unwrap_or(Money::ZERO);
        price.saturating_sub(best)
    }
}

// ============================================================================
// Showtimes
// ============================================================================

/// Sales status of a showtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowtimeStatus {
    /// Announced, not yet on sale
    Scheduled,
    /// Tickets on sale
    OnSale,
    /// Few seats left
    AlmostFull,
    /// No seats left
    SoldOut,
    /// Screening canceled
    Canceled,
}

/// A scheduled screening of a movie in a theater
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieShowtime {
    /// Identifier
    pub id: ShowtimeId,
    /// Movie being screened
    pub movie_id: MovieId,
    /// Room (not checked against the theater list)
    pub theater_id: TheaterId,
    /// Screening start
    pub start_time: DateTime<Utc>,
    /// Screening end
    pub end_time: DateTime<Utc>,
    /// Price sheet
    pub price: ShowtimePrice,
    /// Sales status
    pub status: ShowtimeStatus,
    /// Seats still available, tracked independently of bookings
    pub available_seats: u32,
}

impl MovieShowtime {
    /// Length of the screening
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether the screening ends after it starts
    ///
    /// Reported for display; not enforced.
    #[must_use]
    pub fn has_valid_time_range(&self) -> bool {
        self.end_time > self.start_time
    }
}
