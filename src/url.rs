//! Splits the configured download URL.
//!
//! The device engine speaks plain HTTP only, so anything that is not
//! `http://host[:port][/path]` is refused before the radio comes up.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

pub const HTTP_DEFAULT_PORT: u16 = 80;

pub fn parse_url(url: &str) -> Result<UrlParts<'_>, &'static str> {
    let rest = url.strip_prefix("http://").ok_or("unsupported scheme")?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| "invalid port")?),
        None => (authority, HTTP_DEFAULT_PORT),
    };
    if host.is_empty() || host.contains('@') {
        return Err("invalid host");
    }
    Ok(UrlParts { host, port, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_port_and_path() {
        let parts = parse_url("http://10.0.0.2:8080/files/a.bin").unwrap();
        assert_eq!(parts.host, "10.0.0.2");
        assert_eq!(parts.port, 8080);
        assert_eq!(parts.path, "/files/a.bin");
    }

    #[test]
    fn url_without_path_targets_root() {
        let parts = parse_url("http://example.com").unwrap();
        assert_eq!(parts.port, HTTP_DEFAULT_PORT);
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn url_rejects_other_schemes_and_bad_ports() {
        assert!(parse_url("https://example.com/").is_err());
        assert!(parse_url("http://example.com:99999/").is_err());
        assert!(parse_url("http:///path").is_err());
        assert!(parse_url("http://user@example.com/").is_err());
    }
}
