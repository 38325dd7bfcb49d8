//! Minimal IGC flight log parser.
//!
//! # Responsibilities
//! - Read the header records the API exposes (date, pilot, glider type and id)
//! - Read `B` fix records into coordinates
//! - Compute the flown distance along the fixes
//!
//! # Design Decisions
//! - Unknown record types are ignored
//! - A malformed `B` record fails the whole parse rather than skewing the distance

pub mod geo;

use thiserror::Error;

pub use geo::{haversine_km, Fix};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IgcError {
    #[error("no IGC records found")]
    Empty,

    #[error("invalid date header: {0:?}")]
    InvalidDate(String),

    #[error("invalid fix record on line {line}")]
    InvalidFix { line: usize },
}

/// Flight date from the `HFDTE` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl std::fmt::Display for FlightDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Parsed flight log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgcTrack {
    pub date: Option<FlightDate>,
    pub pilot: String,
    pub glider_type: String,
    pub glider_id: String,
    pub fixes: Vec<Fix>,
}

impl IgcTrack {
    /// Sum of great-circle distances between consecutive fixes, in km.
    pub fn distance_km(&self) -> f64 {
        self.fixes
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            // `sum` of an empty f64 iterator is -0.0, which formats as "-0.00"
            .fold(0.0, |total, d| total + d)
    }

    /// Distance formatted for the API, e.g. `"443.26km"`.
    pub fn track_length(&self) -> String {
        format!("{:.2}km", self.distance_km())
    }
}

/// Parse the text of an IGC file.
pub fn parse(input: &str) -> Result<IgcTrack, IgcError> {
    let mut track = IgcTrack::default();
    let mut seen_record = false;

    for (index, line) in input.lines().enumerate() {
        let line = line.trim_end();
        match line.as_bytes().first() {
            Some(b'A') => seen_record = true,
            Some(b'H') => {
                seen_record = true;
                parse_header(line, &mut track)?;
            }
            Some(b'B') => {
                seen_record = true;
                let fix = parse_fix(line).ok_or(IgcError::InvalidFix { line: index + 1 })?;
                track.fixes.push(fix);
            }
            _ => {}
        }
    }

    if !seen_record {
        return Err(IgcError::Empty);
    }
    Ok(track)
}

fn header_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

fn parse_header(line: &str, track: &mut IgcTrack) -> Result<(), IgcError> {
    // The byte after 'H' is the data source (F, O, P); the three-letter subtype follows
    let Some(subtype) = line.get(2..5) else {
        return Ok(());
    };

    match subtype {
        "DTE" => {
            let rest = &line[5..];
            let rest = rest.strip_prefix("DATE:").unwrap_or(rest);
            track.date = Some(parse_date(rest).ok_or_else(|| IgcError::InvalidDate(line.to_string()))?);
        }
        "PLT" => track.pilot = header_value(line),
        "GTY" => track.glider_type = header_value(line),
        "GID" => track.glider_id = header_value(line),
        _ => {}
    }
    Ok(())
}

fn parse_date(s: &str) -> Option<FlightDate> {
    let digits = s.get(0..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let day: u8 = digits[0..2].parse().ok()?;
    let month: u8 = digits[2..4].parse().ok()?;
    let yy: u16 = digits[4..6].parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    Some(FlightDate {
        year: 2000 + yy,
        month,
        day,
    })
}

/// `B HHMMSS DDMMmmm N DDDMMmmm E ...`
fn parse_fix(line: &str) -> Option<Fix> {
    let lat = parse_coordinate(line.get(7..9)?, line.get(9..14)?, line.get(14..15)?, "N", "S")?;
    let lon = parse_coordinate(line.get(15..18)?, line.get(18..23)?, line.get(23..24)?, "E", "W")?;
    Some(Fix { lat, lon })
}

fn parse_coordinate(degrees: &str, minutes: &str, hemisphere: &str, pos: &str, neg: &str) -> Option<f64> {
    if !degrees.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let degrees: f64 = degrees.parse().ok()?;
    // MMmmm: minutes with three implied decimals
    let minutes: f64 = minutes.parse::<f64>().ok()? / 1000.0;
    let value = degrees + minutes / 60.0;

    match hemisphere {
        h if h == pos => Some(value),
        h if h == neg => Some(-value),
        _ => None,
    }
}
