//! Library of parser functions

// standard library
use std::fmt;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{multispace1, space0};
use nom::combinator::{eof, peek};
use nom::number::complete::double;
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

/// Marker lines that delimit the content of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Line declaring the kinetic energy of the incident beam
    BeamEnergy,
    /// Column headings of the angle/radius table
    TableHeader,
    /// Final line of the simulation output
    EndOfRun,
}

impl Marker {
    /// The text searched for in each line
    pub fn phrase(&self) -> &'static str {
        match self {
            Marker::BeamEnergy => "INCIDENT BEAM:",
            Marker::TableHeader => "angle/deg. radius/cm",
            Marker::EndOfRun => "END OF RUN",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

// ! Boolean checks
/// Check for the incident beam energy declaration
pub fn is_beam_energy(i: &str) -> bool {
    i.contains(Marker::BeamEnergy.phrase())
}

/// Check for the table column headings
///
/// Column spacing varies between EGSnrc versions, so the comparison is made on
/// the line with all whitespace runs collapsed to a single space.
pub fn is_table_header(i: &str) -> bool {
    i.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .contains(Marker::TableHeader.phrase())
}

/// Check for the end of run marker
pub fn is_end_of_run(i: &str) -> bool {
    i.contains(Marker::EndOfRun.phrase())
}

// ! Value parsers
/// Energy value immediately following the `INCIDENT BEAM:` marker
///
/// e.g. `KINETIC ENERGY OF THE INCIDENT BEAM:     6.000 MeV`
pub fn beam_energy(i: &str) -> IResult<&str, f64> {
    let (i, _) = take_until(Marker::BeamEnergy.phrase())(i)?;
    let (i, _) = tag(Marker::BeamEnergy.phrase())(i)?;
    preceded(space0, whole_f64)(i)
}

/// First three whitespace delimited values of a data line
///
/// Any trailing columns (e.g. the uncertainty) are ignored.
///
/// e.g. `   3.75   0.050   2.4651E-07   1.23`
pub fn data_triple(i: &str) -> IResult<&str, (f64, f64, f64)> {
    tuple((
        preceded(space0, whole_f64),
        preceded(space0, whole_f64),
        preceded(space0, whole_f64),
    ))(i)
}

/// A float that must be a complete token, i.e. followed by whitespace or EOL
fn whole_f64(i: &str) -> IResult<&str, f64> {
    terminated(double, peek(alt((multispace1, eof))))(i)
}
