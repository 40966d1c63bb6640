//! Strategy parameters: one point in the optimizer's search space.

use crate::domain::error::BandtraderError;

/// The three knobs of the dip-buying strategy.
///
/// `count` is the maximum holding period in calendar days, `pct` the band
/// depth as a fraction of the full two-sigma band, `window` the lookback
/// length in bars. Values are fixed for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParameters {
    pub count: u32,
    pub pct: f64,
    pub window: usize,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        StrategyParameters {
            count: 50,
            pct: 0.30,
            window: 30,
        }
    }
}

impl StrategyParameters {
    pub fn new(count: u32, pct: f64, window: usize) -> Self {
        StrategyParameters { count, pct, window }
    }

    pub fn validate(&self) -> Result<(), BandtraderError> {
        validate_pct(self.pct)?;
        validate_window(self.window)?;
        Ok(())
    }
}

fn validate_pct(pct: f64) -> Result<(), BandtraderError> {
    if !pct.is_finite() || !(0.0..=1.0).contains(&pct) {
        return Err(BandtraderError::InvalidParameter {
            name: "pct".to_string(),
            reason: format!("must be between 0 and 1, got {pct}"),
        });
    }
    Ok(())
}

fn validate_window(window: usize) -> Result<(), BandtraderError> {
    if window == 0 {
        return Err(BandtraderError::InvalidParameter {
            name: "window".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters() {
        let p = StrategyParameters::default();
        assert_eq!(p.count, 50);
        assert!((p.pct - 0.30).abs() < f64::EPSILON);
        assert_eq!(p.window, 30);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn count_zero_is_valid() {
        let p = StrategyParameters::new(0, 0.5, 10);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn pct_bounds_are_inclusive() {
        assert!(StrategyParameters::new(10, 0.0, 5).validate().is_ok());
        assert!(StrategyParameters::new(10, 1.0, 5).validate().is_ok());
    }

    #[test]
    fn pct_out_of_range_fails() {
        let err = StrategyParameters::new(10, 1.01, 5).validate().unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidParameter { name, .. } if name == "pct"));
        let err = StrategyParameters::new(10, -0.1, 5).validate().unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidParameter { name, .. } if name == "pct"));
    }

    #[test]
    fn pct_nan_fails() {
        let err = StrategyParameters::new(10, f64::NAN, 5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidParameter { name, .. } if name == "pct"));
    }

    #[test]
    fn window_zero_fails() {
        let err = StrategyParameters::new(10, 0.5, 0).validate().unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidParameter { name, .. } if name == "window"));
    }
}
