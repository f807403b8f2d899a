pub mod chunking;
pub mod config;
pub mod corpus;
pub mod error;
pub mod normalize;
pub mod preprocess;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use error::AppError;

pub fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::new("INTERNAL_TIME_FAILED", "Failed to format time").with_details(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_parses_back_as_rfc3339() {
        let ts = now_rfc3339_utc().expect("now");
        assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok());
    }
}
