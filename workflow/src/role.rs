use std::fmt;
use std::str::FromStr;

/// The loop-nesting relationship an endpoint represents,
/// relative to the loop level of the node that owns it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PortRole {
    /// Connection stays at the node's own loop level.
    Same,
    /// Boundary to the enclosing loop level. For a driver, these are the
    /// endpoints that connect it to the loop around it.
    Outer,
    /// Boundary into a nested loop, e.g. a driver broadcasting down to a nested sink.
    Inner,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown port role '{0}' (expected 'same', 'outer' or 'inner')")]
pub struct ParseRoleError(String);

impl PortRole {
    #[inline]
    pub fn is_inner(self) -> bool {
        self == Self::Inner
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Same => "same",
            Self::Outer => "outer",
            Self::Inner => "inner",
        };
        f.write_str(s)
    }
}

impl FromStr for PortRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "same" | "same_loop" | "self" => Ok(Self::Same),
            "outer" | "outer_loop" => Ok(Self::Outer),
            "inner" | "inner_loop" => Ok(Self::Inner),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("same".parse::<PortRole>().unwrap(), PortRole::Same);
        assert_eq!("SAME_LOOP".parse::<PortRole>().unwrap(), PortRole::Same);
        assert_eq!("outer_loop".parse::<PortRole>().unwrap(), PortRole::Outer);
        assert_eq!("Inner".parse::<PortRole>().unwrap(), PortRole::Inner);
        assert!("sideways".parse::<PortRole>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for role in [PortRole::Same, PortRole::Outer, PortRole::Inner] {
            assert_eq!(role.to_string().parse::<PortRole>().unwrap(), role);
        }
    }
}
