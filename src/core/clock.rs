// RFC 3339 UTC timestamps for record creation times.
use crate::core::error::{Error, ErrorKind};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_rfc3339() -> Result<String, Error> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("time went backwards")
                .with_source(err)
        })?;
    format_rfc3339(duration.as_nanos() as u64)
}

fn format_rfc3339(timestamp_ns: u64) -> Result<String, Error> {
    use time::format_description::well_known::Rfc3339;
    let ts =
        time::OffsetDateTime::from_unix_timestamp_nanos(timestamp_ns as i128).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("invalid timestamp")
                .with_source(err)
        })?;
    ts.format(&Rfc3339).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("timestamp format failed")
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{format_rfc3339, now_rfc3339};
    use time::format_description::well_known::Rfc3339;

    #[test]
    fn epoch_formats_as_utc() {
        assert_eq!(format_rfc3339(0).expect("format"), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn now_parses_back() {
        let stamp = now_rfc3339().expect("now");
        let parsed = time::OffsetDateTime::parse(&stamp, &Rfc3339).expect("parse");
        assert!(parsed.year() >= 2024);
    }
}
