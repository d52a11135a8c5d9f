use crate::error::ShowreelError;

/// A normalized absolute URL plus its cache-key fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    pub href: String,
    pub fingerprint: String,
}

/// Normalize a raw user-submitted URL: trim whitespace, default to
/// https when no scheme is given, then parse. Idempotent — feeding the
/// canonical href back in yields the same CanonicalUrl.
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, ShowreelError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = url::Url::parse(&with_scheme)
        .map_err(|_| ShowreelError::InvalidUrl(raw.to_string()))?;

    let href = parsed.to_string();
    let fingerprint = fingerprint(&href);
    Ok(CanonicalUrl { href, fingerprint })
}

/// Deterministic fingerprint of a canonical URL string. A 32-bit
/// rolling hash rendered base-36 — a pure function of its input, stable
/// across process restarts, so repeated submissions hit the same cache
/// key.
pub fn fingerprint(href: &str) -> String {
    let mut hash: i32 = 0;
    for ch in href.chars() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(ch as i32);
    }
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}
