//! Observation times encoded in product filenames.
//!
//! Filenames split on `_` into exactly six tokens:
//! `<prefix>_<product>_<satellite>_<start>_<end>_<suffix>`
//!
//! * composite images: `s20200101T000000Z` / `e20200101T001000Z`
//! * level-1b radiances: `s20193651200150` / `e20193651200160`, year, day of year, hour,
//!   minute, second and a trailing tenths digit which is dropped.

use crate::{
    error::{malformed_entry, Result},
    product::Product,
    satellite::Satellite,
};
use chrono::NaiveDateTime;

const DELIMITER: char = '_';
const NUM_TOKENS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamingFamily {
    CompositeImage,
    L1bRadiance,
}

impl NamingFamily {
    pub fn parse(self, name: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let tokens: Vec<&str> = name.split(DELIMITER).collect();
        if tokens.len() != NUM_TOKENS {
            return Err(malformed_entry(
                name,
                format!("expected {} tokens, found {}", NUM_TOKENS, tokens.len()),
            ));
        }

        let (start_str, end_str) = (tokens[3], tokens[4]);

        let (start, end) = match self {
            NamingFamily::CompositeImage => (
                parse_token(name, start_str, "s%Y%m%dT%H%M%SZ")?,
                parse_token(name, end_str, "e%Y%m%dT%H%M%SZ")?,
            ),
            NamingFamily::L1bRadiance => (
                parse_token(name, drop_last_char(start_str), "s%Y%j%H%M%S")?,
                parse_token(name, drop_last_char(end_str), "e%Y%j%H%M%S")?,
            ),
        };

        Ok((start, end))
    }
}

fn drop_last_char(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next_back();
    chars.as_str()
}

fn parse_token(name: &str, token: &str, fmt: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(token, fmt)
        .map_err(|err| malformed_entry(name, format!("bad time token '{}': {}", token, err)))
}

/// Observation interval of a listed file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObservationTimes {
    Resolved {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// No grammar is known for the product, or the name did not match it.
    Unresolved,
}

impl ObservationTimes {
    pub fn start(&self) -> Option<NaiveDateTime> {
        match *self {
            ObservationTimes::Resolved { start, .. } => Some(start),
            ObservationTimes::Unresolved => None,
        }
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        match *self {
            ObservationTimes::Resolved { end, .. } => Some(end),
            ObservationTimes::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ObservationTimes::Resolved { .. })
    }
}

/// Resolves filenames listed for one satellite and product.
#[derive(Clone, Copy, Debug)]
pub struct NameParser {
    satellite: Satellite,
    product: Product,
}

impl NameParser {
    pub fn new(satellite: Satellite, product: Product) -> Self {
        Self { satellite, product }
    }

    pub fn satellite(&self) -> Satellite {
        self.satellite
    }

    pub fn product(&self) -> Product {
        self.product
    }

    /// Products without a known grammar resolve to `Unresolved` rather than an error.
    pub fn get_dates(&self, name: &str) -> Result<ObservationTimes> {
        match self.product.family() {
            Some(family) => {
                let (start, end) = family.parse(name)?;
                Ok(ObservationTimes::Resolved { start, end })
            }
            None => Ok(ObservationTimes::Unresolved),
        }
    }
}
