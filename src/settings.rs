use traverse::{FailureStop, Limits, ParseFailureStopError};
use workflow::Graph;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown setting '{0}' (expected 'failure-stop', 'dedup-failure-targets' or 'max-steps')")]
    UnknownKey(String),
    #[error(transparent)]
    FailureStop(#[from] ParseFailureStopError),
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Tunable analysis behavior. Defaults fit the workflow runtime;
/// a runtime carrying these in its own configuration can apply them with [`Settings::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Where failure propagation paths end.
    pub failure_stop: FailureStop,
    /// Drop failure paths that end on an input an earlier path already reaches.
    pub dedup_failure_targets: bool,
    /// Steps a query may take without finishing a path.
    /// `None` derives a bound from the graph's size.
    pub max_steps: Option<usize>,
}

impl Settings {
    /// Apply one `key = value` setting, as it would appear in a runtime's config.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let invalid = || Error::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        match key {
            "failure-stop" => self.failure_stop = value.parse()?,
            "dedup-failure-targets" => {
                self.dedup_failure_targets = value.parse().map_err(|_| invalid())?
            }
            "max-steps" => {
                self.max_steps = match value {
                    "auto" => None,
                    n => Some(n.parse().map_err(|_| invalid())?),
                }
            }
            _ => return Err(Error::UnknownKey(key.to_owned())),
        }
        Ok(())
    }

    /// Step bound for queries on `graph`.
    pub fn limits(&self, graph: &Graph) -> Limits {
        let limits = Limits::for_graph(graph);
        match self.max_steps {
            Some(n) => limits.with_max_steps(n),
            None => limits,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_set() -> Result<()> {
        let mut settings = Settings::default();
        settings.set("failure-stop", "sink")?;
        settings.set("dedup-failure-targets", "true")?;
        settings.set("max-steps", "500")?;
        assert_eq!(
            settings,
            Settings {
                failure_stop: FailureStop::AtSink,
                dedup_failure_targets: true,
                max_steps: Some(500),
            }
        );
        settings.set("max-steps", "auto")?;
        assert_eq!(settings.max_steps, None);
        Ok(())
    }

    #[test]
    fn test_set_errors() {
        let mut settings = Settings::default();
        assert!(matches!(settings.set("colour", "red"), Err(Error::UnknownKey(_))));
        assert!(matches!(settings.set("failure-stop", "never"), Err(Error::FailureStop(_))));
        assert!(matches!(
            settings.set("max-steps", "lots"),
            Err(Error::InvalidValue { .. })
        ));
        assert_eq!(settings, Settings::default());
    }
}
