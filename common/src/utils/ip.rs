use std::net::Ipv4Addr;

/// Returns the address when `s` is an IPv4 dotted-quad literal.
///
/// Anything else, including hostnames and IPv6 literals, is `None`.
pub fn as_dotted_quad(s: &str) -> Option<Ipv4Addr> {
    if s.split('.').count() != 4 {
        return None;
    }
    s.parse::<Ipv4Addr>().ok()
}

/// Strips the root label dot from a fully qualified DNS name.
pub fn trim_root_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_quad() {
        assert_eq!(as_dotted_quad("192.0.2.1"), Some(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(as_dotted_quad("0.0.0.0"), Some(Ipv4Addr::UNSPECIFIED));
        assert_eq!(as_dotted_quad("example.com"), None);
        assert_eq!(as_dotted_quad("::1"), None);
        assert_eq!(as_dotted_quad("1.2.3"), None);
        assert_eq!(as_dotted_quad("1.2.3.4.5"), None);
        assert_eq!(as_dotted_quad("256.1.1.1"), None);
        assert_eq!(as_dotted_quad(""), None);
    }

    #[test]
    fn test_trim_root_dot() {
        assert_eq!(trim_root_dot("host.example.com."), "host.example.com");
        assert_eq!(trim_root_dot("host.example.com"), "host.example.com");
    }
}
