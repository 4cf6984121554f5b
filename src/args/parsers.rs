use std::net::SocketAddr;
use std::time::Duration;

use crate::bucket::Granularity;
use crate::error::ValidationError;

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|minutes| minutes.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}

pub(crate) fn parse_granularity(s: &str) -> Result<Granularity, ValidationError> {
    s.parse::<Granularity>()
}

pub(crate) fn parse_listen_addr(s: &str) -> Result<SocketAddr, ValidationError> {
    s.trim()
        .parse::<SocketAddr>()
        .map_err(|err| ValidationError::InvalidListenAddress {
            value: s.to_owned(),
            source: err,
        })
}

pub(crate) fn parse_limit(s: &str) -> Result<u32, ValidationError> {
    let limit: u32 = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidLimit {
            value: s.to_owned(),
            source: err,
        })?;
    if limit == 0 {
        return Err(ValidationError::LimitZero);
    }
    Ok(limit)
}

/// Accepts an absolute http(s) base URL; the returned string has no trailing slash.
pub(crate) fn parse_api_url(s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    url::Url::parse(trimmed).map_err(|err| ValidationError::InvalidApiUrl {
        value: s.to_owned(),
        source: err,
    })?;
    Ok(trimmed.trim_end_matches('/').to_owned())
}
