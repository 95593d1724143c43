use std::fmt;
use std::str::FromStr;

/// Where failure propagation stops walking forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailureStop {
    /// End each path at the driver of the loop the failure is reported to,
    /// since that driver handles the failure for its whole loop.
    #[default]
    AtGoverningDriver,
    /// Keep walking through drivers, ending paths only at sinks.
    AtSink,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown failure stop rule '{0}' (expected 'driver' or 'sink')")]
pub struct ParseFailureStopError(String);

impl fmt::Display for FailureStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtGoverningDriver => f.write_str("driver"),
            Self::AtSink => f.write_str("sink"),
        }
    }
}

impl FromStr for FailureStop {
    type Err = ParseFailureStopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" | "governing-driver" => Ok(Self::AtGoverningDriver),
            "sink" => Ok(Self::AtSink),
            _ => Err(ParseFailureStopError(s.to_owned())),
        }
    }
}
