//! Synthetic experiment generator
//!
//! Draws an observation table with a known lift, for demos and for checking
//! the analysis end to end. For each user:
//!
//! - treatment: Bernoulli with the treatment share
//! - impressions: Poisson around the mean, the same in both groups
//! - day: uniform over `1..=7`, hour: uniform over `0..24`
//! - conversion: Bernoulli with the baseline rate, plus the lift when treated
//!
//! The same parameters and seed always produce the same table.

use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution as _, Poisson};
use rand_pcg::Pcg32;

use crate::observation::{Observation, ObservationTable};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SyntheticError {
    #[display("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[display("mean impressions must be positive and finite, got {value}")]
    InvalidMeanImpressions { value: f64 },
}

/// Parameters of a synthetic experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticExperiment {
    /// Number of users
    pub rows: usize,
    /// Probability of a user being in the test group
    pub treatment_share: f64,
    /// Conversion probability without the ad
    pub baseline_rate: f64,
    /// Added conversion probability for treated users
    pub lift: f64,
    /// Mean total impressions per user
    pub mean_impressions: f64,
    pub seed: u64,
}

impl Default for SyntheticExperiment {
    fn default() -> Self {
        Self {
            rows: 10_000,
            treatment_share: 0.96,
            baseline_rate: 0.018,
            lift: 0.008,
            mean_impressions: 25.0,
            seed: 0,
        }
    }
}

impl SyntheticExperiment {
    fn validate(&self) -> Result<(), SyntheticError> {
        let probabilities = [
            ("treatment share", self.treatment_share),
            ("baseline rate", self.baseline_rate),
            ("baseline rate plus lift", self.baseline_rate + self.lift),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SyntheticError::InvalidProbability { name, value });
            }
        }
        if !self.mean_impressions.is_finite() || self.mean_impressions <= 0.0 {
            return Err(SyntheticError::InvalidMeanImpressions {
                value: self.mean_impressions,
            });
        }
        Ok(())
    }

    /// Draws the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use adlift_analysis::synthetic::SyntheticExperiment;
    ///
    /// let experiment = SyntheticExperiment {
    ///     rows: 500,
    ///     seed: 7,
    ///     ..SyntheticExperiment::default()
    /// };
    /// let table = experiment.generate().unwrap();
    /// assert_eq!(table.len(), 500);
    /// assert_eq!(table, experiment.generate().unwrap());
    /// ```
    pub fn generate(&self) -> Result<ObservationTable, SyntheticError> {
        self.validate()?;
        let impressions = Poisson::new(self.mean_impressions).map_err(|_| {
            SyntheticError::InvalidMeanImpressions {
                value: self.mean_impressions,
            }
        })?;

        let mut rng = Pcg32::seed_from_u64(self.seed);
        let table = (0..self.rows)
            .map(|_| self.draw(&mut rng, &impressions))
            .collect::<ObservationTable>();

        tracing::info!(
            rows = table.len(),
            seed = self.seed,
            "generated synthetic experiment"
        );
        Ok(table)
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw<R>(&self, rng: &mut R, impressions: &Poisson<f64>) -> Observation
    where
        R: Rng,
    {
        let treated = rng.random_bool(self.treatment_share);
        let total_impressions = impressions.sample(rng).min(f64::from(u32::MAX)) as u32;
        let mode_day = rng.random_range(1..=7);
        let mode_hour = rng.random_range(0..24);
        let rate = if treated {
            self.baseline_rate + self.lift
        } else {
            self.baseline_rate
        };
        let converted = rng.random_bool(rate);
        Observation {
            treated,
            converted,
            total_impressions,
            mode_day,
            mode_hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effectiveness::Effectiveness, observation::Group};

    #[test]
    fn test_same_seed_same_table() {
        let experiment = SyntheticExperiment {
            rows: 1_000,
            seed: 42,
            ..SyntheticExperiment::default()
        };
        let a = experiment.generate().unwrap();
        let b = experiment.generate().unwrap();
        assert_eq!(a, b);

        let other = SyntheticExperiment {
            seed: 43,
            ..experiment
        }
        .generate()
        .unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_codes_within_range() {
        let table = SyntheticExperiment {
            rows: 2_000,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap();
        assert!(table.rows().iter().all(|row| (1..=7).contains(&row.mode_day)));
        assert!(table.rows().iter().all(|row| (0..24).contains(&row.mode_hour)));
        assert!(table.group_size(Group::Test) > table.group_size(Group::Control));
    }

    #[test]
    fn test_csv_round_trip() {
        let table = SyntheticExperiment {
            rows: 50,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        assert!(csv.starts_with("test,converted,tot_impr,mode_impr_day,mode_impr_hour\n"));
        let read = ObservationTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(read, table);
    }

    #[test]
    fn test_lift_is_recovered() {
        let table = SyntheticExperiment {
            rows: 200_000,
            treatment_share: 0.5,
            baseline_rate: 0.05,
            lift: 0.03,
            seed: 1,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap();
        let model = Effectiveness::run(&table, 0.05);
        assert!((model.lift() - 0.03).abs() < 0.005, "lift {}", model.lift());
        assert!((model.baseline_rate() - 0.05).abs() < 0.005);
        assert!(model.p_value() < 0.05);
    }

    #[test]
    fn test_invalid_parameters() {
        let err = SyntheticExperiment {
            treatment_share: 1.5,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap_err();
        assert!(err.to_string().contains("treatment share"));

        let err = SyntheticExperiment {
            baseline_rate: 0.9,
            lift: 0.2,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap_err();
        assert!(err.to_string().contains("baseline rate plus lift"));

        let err = SyntheticExperiment {
            mean_impressions: 0.0,
            ..SyntheticExperiment::default()
        }
        .generate()
        .unwrap_err();
        assert!(matches!(err, SyntheticError::InvalidMeanImpressions { .. }));
    }
}
