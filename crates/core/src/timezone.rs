//! IANA timezone resolution.
//!
//! Wall-clock arithmetic (active periods) needs a real timezone database so
//! DST transitions land where they do in the zone. Lookup goes through
//! [`TimezoneLookup`] so callers can inject their own resolver.

use chrono_tz::Tz;

use crate::error::{OncallError, Result};

/// Resolves an IANA identifier (e.g. `"Europe/Berlin"`) to a zone.
pub trait TimezoneLookup {
    fn lookup(&self, name: &str) -> Result<Tz>;
}

/// Resolver backed by the bundled `chrono-tz` database.
#[derive(Debug, Clone, Copy, Default)]
pub struct IanaTimezones;

impl TimezoneLookup for IanaTimezones {
    fn lookup(&self, name: &str) -> Result<Tz> {
        name.trim()
            .parse::<Tz>()
            .map_err(|_| OncallError::UnknownTimezone(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_zones() {
        assert_eq!(IanaTimezones.lookup("UTC").unwrap(), Tz::UTC);
        assert_eq!(
            IanaTimezones.lookup("America/New_York").unwrap(),
            Tz::America__New_York
        );
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert_eq!(
            IanaTimezones.lookup("Mars/Olympus_Mons"),
            Err(OncallError::UnknownTimezone("Mars/Olympus_Mons".into()))
        );
    }
}
