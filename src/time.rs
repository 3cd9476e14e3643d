/// Splitpoint meaning "until the end of the file", the largest representable
/// duration in hundredths of a second.
pub const EOF_TIME: i64 = i64::MAX;

/// Parse a `min.sec[.frac]` token (or the literal `EOF`) into hundredths of a
/// second. Returns `None` when the token is not a time expression at all or
/// when seconds/hundredths are out of range; the caller then treats the token
/// as a filename.
pub fn parse_time(token: &str) -> Option<i64> {
    if token == "EOF" {
        return Some(EOF_TIME);
    }

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    let mut fields = token.split('.');
    let minutes: i64 = fields.next()?.parse().ok()?;
    let seconds: i64 = fields.next()?.parse().ok()?;
    // The fractional field may be missing or empty; anything after a third
    // dot is ignored.
    let mut hundredths: i64 = match fields.next() {
        Some(field) => field.parse().unwrap_or(0),
        None => 0,
    };

    if seconds > 59 || hundredths > 99 {
        return None;
    }

    // A single fractional digit means tenths, not hundredths.
    if token.len() >= 2 && token.as_bytes()[token.len() - 2] == b'.' {
        hundredths *= 10;
    }

    Some((minutes * 60 + seconds) * 100 + hundredths)
}
