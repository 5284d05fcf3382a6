//! Small validation helpers for network-facing configuration values.
//!
//! Used when splitting the host connection URI and useful to inputs that
//! validate address-like arguments in `do_validation`.

use std::net::Ipv4Addr;

/// Returns `true` if `addr` is a valid dotted-quad IPv4 address.
pub fn is_valid_ip(addr: &str) -> bool {
    addr.trim().parse::<Ipv4Addr>().is_ok()
}

/// Returns `true` if `hostname` is a valid DNS host name.
///
/// Labels must be 1–63 characters of ASCII alphanumerics or hyphens, must
/// not start or end with a hyphen, and the full name must not exceed 255
/// characters. A single trailing dot is tolerated.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 255 {
        return false;
    }
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Returns `true` if `port` parses as a TCP/UDP port in `1..=65535`.
pub fn is_valid_port(port: &str) -> bool {
    matches!(port.trim().parse::<u16>(), Ok(p) if p > 0)
}

/// Returns `true` if `scheme` is a supported connection scheme.
pub fn is_valid_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ips() {
        assert!(is_valid_ip("10.0.0.1"));
        assert!(is_valid_ip(" 255.255.255.255 "));
        assert!(!is_valid_ip("256.0.0.1"));
        assert!(!is_valid_ip("10.0.0"));
        assert!(!is_valid_ip("not-an-ip"));
    }

    #[test]
    fn valid_hostnames() {
        assert!(is_valid_hostname("collector.example.com"));
        assert!(is_valid_hostname("localhost"));
        assert!(is_valid_hostname("a-1.b-2."));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-leading.example.com"));
        assert!(!is_valid_hostname("trailing-.example.com"));
        assert!(!is_valid_hostname("has_underscore.example.com"));
        assert!(!is_valid_hostname(&"x".repeat(256)));
    }

    #[test]
    fn valid_ports() {
        assert!(is_valid_port("1"));
        assert!(is_valid_port("65535"));
        assert!(!is_valid_port("0"));
        assert!(!is_valid_port("65536"));
        assert!(!is_valid_port("http"));
    }

    #[test]
    fn valid_schemes() {
        assert!(is_valid_scheme("http"));
        assert!(is_valid_scheme("HTTPS"));
        assert!(!is_valid_scheme("ftp"));
    }
}
