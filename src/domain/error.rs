//! Domain error types.

/// Top-level error type for bandtrader.
#[derive(Debug, thiserror::Error)]
pub enum BandtraderError {
    #[error("no data for {ticker} in {year}")]
    DataNotFound { ticker: String, year: i32 },

    #[error("bad data in {file}: {reason}")]
    DataFormat { file: String, reason: String },

    #[error("insufficient data for {ticker} in {year}: have {bars} bars, need {needed}")]
    InsufficientData {
        ticker: String,
        year: i32,
        bars: usize,
        needed: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("optimization interrupted before any trial completed")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BandtraderError> for std::process::ExitCode {
    fn from(err: &BandtraderError) -> Self {
        let code: u8 = match err {
            BandtraderError::Io(_) => 1,
            BandtraderError::ConfigParse { .. } | BandtraderError::ConfigInvalid { .. } => 2,
            BandtraderError::InvalidParameter { .. } => 3,
            BandtraderError::DataFormat { .. } => 4,
            BandtraderError::DataNotFound { .. } | BandtraderError::InsufficientData { .. } => 5,
            BandtraderError::Interrupted => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    fn exit_code_of(err: &BandtraderError) -> String {
        let code: ExitCode = err.into();
        format!("{code:?}")
    }

    #[test]
    fn data_errors_share_an_exit_code() {
        let not_found = BandtraderError::DataNotFound {
            ticker: "AAPL".to_string(),
            year: 1999,
        };
        let short = BandtraderError::InsufficientData {
            ticker: "AAPL".to_string(),
            year: 2020,
            bars: 10,
            needed: 30,
        };
        assert_eq!(exit_code_of(&not_found), exit_code_of(&short));
        assert!(exit_code_of(&not_found).contains('5'));
    }

    #[test]
    fn format_errors_are_distinct_from_missing_data() {
        let format = BandtraderError::DataFormat {
            file: "AAPL.csv".to_string(),
            reason: "bad date".to_string(),
        };
        let not_found = BandtraderError::DataNotFound {
            ticker: "AAPL".to_string(),
            year: 2020,
        };
        assert_ne!(exit_code_of(&format), exit_code_of(&not_found));
    }

    #[test]
    fn messages_carry_context() {
        let err = BandtraderError::InsufficientData {
            ticker: "MSFT".to_string(),
            year: 2021,
            bars: 12,
            needed: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("MSFT"));
        assert!(msg.contains("2021"));
        assert!(msg.contains("12"));
        assert!(msg.contains("30"));
    }
}
