use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::debug;
use youbot_kinematics::Configuration;

/// Most configurations reserved up front; longer runs grow on demand.
const MAX_RESERVED: usize = 4096;

/// Configurations in chronological order; index 0 is the initial state and
/// index `i` the state after `i` timesteps. Entries never change once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    configurations: Vec<Configuration>,
}

impl Trajectory {
    pub(crate) fn new(initial: Configuration, steps: usize) -> Self {
        let mut configurations = Vec::with_capacity(steps.min(MAX_RESERVED) + 1);
        configurations.push(initial);
        Trajectory { configurations }
    }

    pub(crate) fn push(&mut self, configuration: Configuration) {
        self.configurations.push(configuration);
    }

    /// Number of configurations, initial state included.
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    /// Always false: a trajectory holds at least its initial state.
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Number of timesteps taken.
    pub fn steps(&self) -> usize {
        self.len() - 1
    }

    pub fn initial(&self) -> &Configuration {
        &self.configurations[0]
    }

    pub fn last(&self) -> &Configuration {
        &self.configurations[self.configurations.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Configuration> {
        self.configurations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configurations.iter()
    }

    pub fn as_slice(&self) -> &[Configuration] {
        &self.configurations
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.configurations.iter()
    }
}

/// Consumer of a finished trajectory.
pub trait TrajectorySink {
    fn write_trajectory(&mut self, trajectory: &Trajectory) -> anyhow::Result<()>;
}

/// Writes one CSV row per configuration: 12 comma-separated fields, no header.
pub struct CsvWriter<W: Write> {
    inner: W,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        CsvWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl CsvWriter<BufWriter<File>> {
    /// Creates the file at `path`, truncating any previous contents.
    pub fn create(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(CsvWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrajectorySink for CsvWriter<W> {
    fn write_trajectory(&mut self, trajectory: &Trajectory) -> anyhow::Result<()> {
        for configuration in trajectory {
            let row = configuration.to_array();
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    self.inner.write_all(b",")?;
                }
                write!(self.inner, "{}", value)?;
            }
            self.inner.write_all(b"\n")?;
        }
        self.inner.flush().context("failed to flush trajectory rows")?;
        debug!(rows = trajectory.len(), "Trajectory written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        let mut trajectory = Trajectory::new(Configuration::default(), 2);
        trajectory.push(Configuration::from([
            0.5, 1.0, -2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.25, 0.25, 0.25, 0.25,
        ]));
        trajectory
    }

    #[test]
    fn test_accessors() {
        let trajectory = sample();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.steps(), 1);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.initial(), &Configuration::default());
        assert_eq!(trajectory.last().chassis.phi, 0.5);
        assert!(trajectory.get(2).is_none());
    }

    #[test]
    fn test_long_runs_do_not_reserve_everything() {
        let trajectory = Trajectory::new(Configuration::default(), crate::simulator::MAX_STEPS);
        assert!(trajectory.configurations.capacity() <= 2 * (MAX_RESERVED + 1));

        let short = Trajectory::new(Configuration::default(), 100);
        assert!(short.configurations.capacity() >= 101);
    }

    #[test]
    fn test_csv_rows() {
        let mut writer = CsvWriter::new(Vec::new());
        writer.write_trajectory(&sample()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "0,0,0,0,0,0,0,0,0,0,0,0\n0.5,1,-2,0,0,0,0,0,0.25,0.25,0.25,0.25\n"
        );
    }
}
