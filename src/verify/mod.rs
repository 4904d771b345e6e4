use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;

/// Severity names accepted by [`is_log_level`]
pub const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

static RE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("digits pattern compiles"));

// Terminal server port numbers are exactly 4 digits
static RE_CONSOLE_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("console port pattern compiles"));

static RE_MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("mac pattern compiles")
});

/// Verify x contains only decimal digits, i.e. is a non-negative integer
pub fn is_digits(x: &str) -> bool {
    RE_DIGITS.is_match(x)
}

/// Verify every character of x is a hexadecimal digit (case-insensitive)
pub fn is_hex(x: &str) -> bool {
    x.chars().all(|c| c.is_ascii_hexdigit())
}

/// Verify x parses as an IPv4 address
pub fn is_ipv4_address(x: &str) -> bool {
    if x.parse::<Ipv4Addr>().is_ok() {
        return true;
    }
    tracing::debug!("Not a valid ipv4 address: {x}. Should be in the form A.B.C.D");
    false
}

/// Verify x is an IPv4 address usable as a device-facing unicast address.
/// Multicast, loopback, reserved, unspecified, and link-local addresses are
/// syntactically valid but nonsensical for a management interface, so they
/// are rejected along with anything carrying an embedded prefix.
pub fn is_ipv4_unicast(x: &str) -> bool {
    if x.contains('/') {
        tracing::debug!("{x} not a unicast ipv4 address -> is_subnet");
        return false;
    }
    let addr: Ipv4Addr = match x.parse() {
        Ok(a) => a,
        Err(_) => {
            tracing::debug!("Not a valid ipv4 address: {x}. Should be in the form A.B.C.D");
            return false;
        }
    };
    let octets = addr.octets();
    let bad_type = if addr.is_multicast() {
        Some("is_multicast")
    } else if addr.is_loopback() {
        Some("is_loopback")
    } else if octets[0] >= 240 {
        // 240.0.0.0/4 is IANA reserved
        Some("is_reserved")
    } else if addr.is_unspecified() {
        Some("is_unspecified")
    } else if octets[0] == 169 && octets[1] == 254 {
        Some("is_link_local")
    } else {
        None
    };
    if let Some(bad_type) = bad_type {
        tracing::debug!("{x} not a unicast ipv4 address -> {bad_type}");
        return false;
    }
    true
}

/// Verify x is a valid IPv4 prefix length
pub fn is_ipv4_mask(x: i64) -> bool {
    if !(0..=32).contains(&x) {
        tracing::debug!("bad ipv4 network mask {x}. Should be an int 0 >= x <= 32");
        return false;
    }
    true
}

/// Verify x parses as an IPv6 address
pub fn is_ipv6_address(x: &str) -> bool {
    if x.parse::<Ipv6Addr>().is_ok() {
        return true;
    }
    tracing::debug!("Not a valid ipv6 address: {x}");
    false
}

fn is_ipv6_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

// Reserved here means outside the blocks a host address can come from:
// global unicast 2000::/3, unique-local fc00::/7, link-local fe80::/10,
// and multicast ff00::/8
fn is_ipv6_reserved(addr: &Ipv6Addr) -> bool {
    let top = addr.segments()[0];
    let global_unicast = (0x2000..=0x3fff).contains(&top);
    let unique_local = (top & 0xfe00) == 0xfc00;
    let link_local = (top & 0xffc0) == 0xfe80;
    let multicast = (top & 0xff00) == 0xff00;
    !(global_unicast || unique_local || link_local || multicast)
}

/// Verify x is an IPv6 address usable as a device-facing unicast address.
/// A trailing literal `.0` marks a malformed subnet-looking string and is
/// rejected even when the address itself parses.
pub fn is_ipv6_unicast(x: &str) -> bool {
    let addr: Ipv6Addr = match x.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("{x} is not a valid ipv6 address. Parse detail: {e}");
            return false;
        }
    };
    let bad_type = if addr.is_multicast() {
        Some("is_multicast")
    } else if addr.is_loopback() {
        Some("is_loopback")
    } else if addr.is_unspecified() {
        Some("is_unspecified")
    } else if is_ipv6_link_local(&addr) {
        Some("is_link_local")
    } else if is_ipv6_reserved(&addr) {
        Some("is_reserved")
    } else if x.ends_with(".0") {
        Some("is_subnet")
    } else {
        None
    };
    if let Some(bad_type) = bad_type {
        tracing::error!("{x} not a unicast ipv6 address -> {bad_type}");
        return false;
    }
    true
}

/// Verify x is a valid IPv6 prefix length
pub fn is_ipv6_mask(x: i64) -> bool {
    if !(0..=128).contains(&x) {
        tracing::debug!("bad ipv6 network mask {x}. Should be an int 0 >= x <= 128");
        return false;
    }
    true
}

/// Verify x is a mac address: six groups of two hex digits delimited by
/// `:` or `-`, case-insensitive
pub fn is_mac_address(x: &str) -> bool {
    RE_MAC_ADDRESS.is_match(x)
}

/// Verify x is a terminal server console port number (exactly 4 digits)
pub fn is_console_port(x: &str) -> bool {
    RE_CONSOLE_PORT.is_match(x)
}

/// Verify x is a power of b.
///
/// ```
/// assert!(testbed_map::verify::is_power_of(8, 2));
/// assert!(!testbed_map::verify::is_power_of(7, 2));
/// ```
pub fn is_power_of(x: u64, b: u64) -> bool {
    match b {
        // 0^0 == 1, 0^k == 0 for k >= 1
        0 => x <= 1,
        1 => x == 1,
        _ => {
            let mut v: u64 = 1;
            while v < x {
                v = match v.checked_mul(b) {
                    Some(n) => n,
                    None => return false,
                };
            }
            v == x
        }
    }
}

/// Verify x is one of the known logging severity names
pub fn is_log_level(x: &str) -> bool {
    LOG_LEVELS.contains(&x)
}

/// Verify v is a boolean value
pub fn is_bool(v: &Value) -> bool {
    v.is_boolean()
}

/// Verify v is an integer
pub fn is_int(v: &Value) -> bool {
    v.is_i64() || v.is_u64()
}

/// Verify v is a float
pub fn is_float(v: &Value) -> bool {
    v.is_f64()
}

/// Verify v is a mapping
pub fn is_mapping(v: &Value) -> bool {
    v.is_object()
}

/// Verify v is an ordered sequence
pub fn is_sequence(v: &Value) -> bool {
    v.is_array()
}

/// Verify v is an ordered sequence containing only integers
pub fn is_sequence_of_ints(v: &Value) -> bool {
    let Some(items) = v.as_array() else {
        return false;
    };
    for item in items {
        if !is_int(item) {
            tracing::debug!("One or more elements of sequence are not integers: {v}");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_digits() {
        assert!(is_digits("0"));
        assert!(is_digits("301"));
        assert!(is_digits("0042"));
        assert!(!is_digits(""));
        assert!(!is_digits("30a"));
        assert!(!is_digits("-3"));
        assert!(!is_digits("3.1"));
        assert!(!is_digits(" 3"));
    }

    #[test]
    fn test_is_hex() {
        assert!(is_hex("deadBEEF01"));
        assert!(is_hex(""));
        assert!(!is_hex("0x1f"));
        assert!(!is_hex("ghij"));
    }

    #[test]
    fn test_is_ipv4_unicast() {
        assert!(is_ipv4_unicast("10.0.0.5"));
        assert!(is_ipv4_unicast("172.29.167.208"));
        assert!(!is_ipv4_unicast("224.0.0.1")); // multicast
        assert!(!is_ipv4_unicast("127.0.0.1")); // loopback
        assert!(!is_ipv4_unicast("240.1.2.3")); // reserved
        assert!(!is_ipv4_unicast("0.0.0.0")); // unspecified
        assert!(!is_ipv4_unicast("169.254.10.10")); // link-local
        assert!(!is_ipv4_unicast("10.0.0.0/24")); // embedded prefix
        assert!(!is_ipv4_unicast("not-an-ip"));
        assert!(!is_ipv4_unicast("256.1.1.1"));
    }

    #[test]
    fn test_is_ipv4_mask() {
        assert!(is_ipv4_mask(0));
        assert!(is_ipv4_mask(24));
        assert!(is_ipv4_mask(32));
        assert!(!is_ipv4_mask(33));
        assert!(!is_ipv4_mask(-1));
    }

    #[test]
    fn test_is_ipv6_unicast() {
        assert!(is_ipv6_unicast("2001:167::208"));
        assert!(is_ipv6_unicast("fd00::1")); // unique-local counts as unicast
        assert!(!is_ipv6_unicast("ff02::1")); // multicast
        assert!(!is_ipv6_unicast("::1")); // loopback
        assert!(!is_ipv6_unicast("::")); // unspecified
        assert!(!is_ipv6_unicast("fe80::1")); // link-local
        assert!(!is_ipv6_unicast("100::1")); // reserved
        assert!(!is_ipv6_unicast("2001::10.0.0.0")); // trailing .0
        assert!(!is_ipv6_unicast("2001::zz"));
    }

    #[test]
    fn test_is_ipv6_mask() {
        assert!(is_ipv6_mask(0));
        assert!(is_ipv6_mask(64));
        assert!(is_ipv6_mask(128));
        assert!(!is_ipv6_mask(129));
        assert!(!is_ipv6_mask(-1));
    }

    #[test]
    fn test_is_mac_address() {
        assert!(is_mac_address("AA:BB:CC:DD:EE:FF"));
        assert!(is_mac_address("aa-bb-cc-dd-ee-ff"));
        assert!(is_mac_address("00:1c:73:AA:bb:CC"));
        assert!(!is_mac_address("AA:BB:CC:DD:EE")); // too few groups
        assert!(!is_mac_address("AA:BB:CC:DD:EE:FF:00")); // too many groups
        assert!(!is_mac_address("AA:BB:CC:DD:EE:GG"));
        assert!(!is_mac_address("AABBCCDDEEFF"));
    }

    #[test]
    fn test_is_console_port() {
        assert!(is_console_port("2033"));
        assert!(is_console_port("0001"));
        assert!(!is_console_port("203"));
        assert!(!is_console_port("20334"));
        assert!(!is_console_port("20a3"));
    }

    #[test]
    fn test_is_power_of() {
        assert!(is_power_of(8, 2));
        assert!(is_power_of(1, 2));
        assert!(is_power_of(81, 3));
        assert!(!is_power_of(7, 2));
        assert!(is_power_of(1, 1));
        assert!(!is_power_of(2, 1));
        assert!(!is_power_of(0, 2));
    }

    #[test]
    fn test_is_log_level() {
        assert!(is_log_level("INFO"));
        assert!(is_log_level("CRITICAL"));
        assert!(!is_log_level("info"));
        assert!(!is_log_level("TRACE"));
    }

    #[test]
    fn test_structural_predicates() {
        assert!(is_bool(&json!(true)));
        assert!(!is_bool(&json!(1)));
        assert!(is_int(&json!(42)));
        assert!(!is_int(&json!(4.2)));
        assert!(is_float(&json!(4.2)));
        assert!(!is_float(&json!(42)));
        assert!(is_mapping(&json!({"a": 1})));
        assert!(!is_mapping(&json!([1])));
        assert!(is_sequence(&json!([1, 2])));
        assert!(!is_sequence(&json!("x")));
        assert!(is_sequence_of_ints(&json!([1, 2, 3])));
        assert!(!is_sequence_of_ints(&json!([1, "2"])));
        assert!(!is_sequence_of_ints(&json!("1")));
    }
}
