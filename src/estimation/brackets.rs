//! Square-footage classification
//!
//! Cost lookups and schedule lookups bucket square footage independently:
//! a fine cost ladder and a coarse schedule ladder. Both cover 500..=5000
//! square feet and report anything outside that as `OutOfRange`.

pub const MIN_SQUARE_FEET: f64 = 500.0;
pub const MAX_SQUARE_FEET: f64 = 5000.0;

pub fn in_range(sqft: f64) -> bool {
    (MIN_SQUARE_FEET..=MAX_SQUARE_FEET).contains(&sqft)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBracket {
    OutOfRange,
    Sqft700,
    Sqft900,
    Sqft1100,
    Sqft1300,
    Sqft1500,
    Sqft2000,
    Sqft2500,
    Sqft3000,
    Sqft3500,
    Sqft4000,
    Sqft4500,
}

impl CostBracket {
    /// In-range brackets in ascending order
    pub const LADDER: [CostBracket; 11] = [
        CostBracket::Sqft700,
        CostBracket::Sqft900,
        CostBracket::Sqft1100,
        CostBracket::Sqft1300,
        CostBracket::Sqft1500,
        CostBracket::Sqft2000,
        CostBracket::Sqft2500,
        CostBracket::Sqft3000,
        CostBracket::Sqft3500,
        CostBracket::Sqft4000,
        CostBracket::Sqft4500,
    ];

    /// Column key of the bracket in sqft-keyed tables
    pub fn column_key(self) -> Option<&'static str> {
        let key = match self {
            Self::OutOfRange => return None,
            Self::Sqft700 => "700",
            Self::Sqft900 => "900",
            Self::Sqft1100 => "1100",
            Self::Sqft1300 => "1300",
            Self::Sqft1500 => "1500",
            Self::Sqft2000 => "2000",
            Self::Sqft2500 => "2500",
            Self::Sqft3000 => "3000",
            Self::Sqft3500 => "3500",
            Self::Sqft4000 => "4000",
            Self::Sqft4500 => "4500",
        };
        Some(key)
    }

    /// Every bracket from the bottom of the ladder up to and including this
    /// one. Empty when out of range.
    pub fn steps(self) -> &'static [CostBracket] {
        match Self::LADDER.iter().position(|b| *b == self) {
            Some(idx) => &Self::LADDER[..=idx],
            None => &[],
        }
    }
}

/// Classify square footage on the cost ladder.
///
/// 500..900 falls in the 700 bracket; 4500..=5000 in the 4500 bracket.
pub fn cost_bracket(sqft: f64) -> CostBracket {
    if !in_range(sqft) {
        return CostBracket::OutOfRange;
    }
    match sqft {
        s if s < 900.0 => CostBracket::Sqft700,
        s if s < 1100.0 => CostBracket::Sqft900,
        s if s < 1300.0 => CostBracket::Sqft1100,
        s if s < 1500.0 => CostBracket::Sqft1300,
        s if s < 2000.0 => CostBracket::Sqft1500,
        s if s < 2500.0 => CostBracket::Sqft2000,
        s if s < 3000.0 => CostBracket::Sqft2500,
        s if s < 3500.0 => CostBracket::Sqft3000,
        s if s < 4000.0 => CostBracket::Sqft3500,
        s if s < 4500.0 => CostBracket::Sqft4000,
        _ => CostBracket::Sqft4500,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleBracket {
    OutOfRange,
    Sqft500,
    Sqft1000,
    Sqft2000,
    Sqft3500,
    Sqft5000,
}

impl ScheduleBracket {
    pub fn column_key(self) -> Option<&'static str> {
        match self {
            Self::OutOfRange => None,
            Self::Sqft500 => Some("500"),
            Self::Sqft1000 => Some("1000"),
            Self::Sqft2000 => Some("2000"),
            Self::Sqft3500 => Some("3500"),
            Self::Sqft5000 => Some("5000"),
        }
    }
}

/// Classify square footage on the schedule ladder. Never used for costs.
pub fn schedule_bracket(sqft: f64) -> ScheduleBracket {
    if !in_range(sqft) {
        return ScheduleBracket::OutOfRange;
    }
    match sqft {
        s if s < 800.0 => ScheduleBracket::Sqft500,
        s if s < 1400.0 => ScheduleBracket::Sqft1000,
        s if s < 2800.0 => ScheduleBracket::Sqft2000,
        s if s < 4200.0 => ScheduleBracket::Sqft3500,
        _ => ScheduleBracket::Sqft5000,
    }
}

/// Square footage when within the supported range, else 0.
pub fn area_within_limit(sqft: f64) -> f64 {
    if in_range(sqft) {
        sqft
    } else {
        0.0
    }
}

/// Square footage scaled down by an economy-of-size factor.
pub fn scaled_area(sqft: f64) -> f64 {
    const SCALE: [(f64, f64); 5] = [
        (900.0, 0.99),
        (2000.0, 0.8),
        (3000.0, 0.85),
        (4000.0, 0.9),
        (5000.0, 0.95),
    ];
    SCALE
        .iter()
        .find(|(ceiling, _)| sqft <= *ceiling)
        .map(|(_, factor)| sqft * factor)
        .unwrap_or(0.0)
}
