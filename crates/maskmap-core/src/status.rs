//! Stock-status classification for mask reporting stations.
//!
//! The remote API reports supply as a raw string code in `remain_stat`:
//! 100+ units is `"plenty"`, 30–99 `"some"`, 2–29 `"few"`, 0–1 `"empty"`,
//! and a station that has stopped selling reports `"break"`. A null field
//! means the station never reported at all.

/// Marker tint used when a station is drawn as a map pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinColor {
    Green,
    Yellow,
    Red,
    Gray,
    Black,
}

impl PinColor {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PinColor::Green => "green",
            PinColor::Yellow => "yellow",
            PinColor::Red => "red",
            PinColor::Gray => "gray",
            PinColor::Black => "black",
        }
    }
}

/// Categorical mask-supply level reported by a station.
///
/// Exactly one variant per record. `Unknown` covers a null `remain_stat`;
/// a present-but-unrecognized code resolves to `Suspended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Plenty,
    Some,
    Few,
    Empty,
    Suspended,
    Unknown,
}

impl StockStatus {
    /// Resolves a raw `remain_stat` value into a status variant.
    ///
    /// A missing field means the station never reported and maps to
    /// `Unknown`. Any present code that is not one of the four stock levels
    /// maps to `Suspended` — the documented suspension code is `"break"`,
    /// and unrecognized codes land in the same bucket rather than failing
    /// the record.
    #[must_use]
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            None => StockStatus::Unknown,
            Some("plenty") => StockStatus::Plenty,
            Some("some") => StockStatus::Some,
            Some("few") => StockStatus::Few,
            Some("empty") => StockStatus::Empty,
            Some(_) => StockStatus::Suspended,
        }
    }

    /// The wire code for this status, `None` for `Unknown` (which has no
    /// code of its own).
    #[must_use]
    pub const fn code(self) -> Option<&'static str> {
        match self {
            StockStatus::Plenty => Some("plenty"),
            StockStatus::Some => Some("some"),
            StockStatus::Few => Some("few"),
            StockStatus::Empty => Some("empty"),
            StockStatus::Suspended => Some("break"),
            StockStatus::Unknown => None,
        }
    }

    /// Human-readable supply label, in the wording the reporting service
    /// publishes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StockStatus::Plenty => "100개 이상",
            StockStatus::Some => "30 ~ 100개",
            StockStatus::Few => "30개 이하",
            StockStatus::Empty => "없음",
            StockStatus::Suspended => "중지",
            StockStatus::Unknown => "미상",
        }
    }

    /// Pin tint for this status.
    #[must_use]
    pub const fn color(self) -> PinColor {
        match self {
            StockStatus::Plenty => PinColor::Green,
            StockStatus::Some => PinColor::Yellow,
            StockStatus::Few => PinColor::Red,
            StockStatus::Empty => PinColor::Gray,
            StockStatus::Suspended | StockStatus::Unknown => PinColor::Black,
        }
    }
}
