//! Connection descriptor parsing.
//!
//! A target is configured as a single string:
//!
//! ```text
//! user:password@interface(host[:port])
//! ```
//!
//! Every part is optional. An empty descriptor means "local BMC, tool
//! defaults". Unspecified parts stay empty; defaults (interface, privilege)
//! are the caller's business.

use crate::error::{IpmiError, Result};
use std::fmt;
use std::str::FromStr;

/// Decoded connection descriptor.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub username: String,
    pub password: String,
    pub interface: String,
    /// Remote BMC host. `None` means the local BMC.
    pub host: Option<String>,
    /// Remote port, if the host carried one.
    pub port: Option<u16>,
}

impl ConnectionDescriptor {
    /// Parse a descriptor string.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Ok(Self::default());
        }

        let (credentials, transport) = match descriptor.split_once('@') {
            Some((credentials, transport)) => (credentials, transport),
            // Without '@' the string is either a bare transport or bare credentials.
            None if descriptor.contains(['(', ')']) => ("", descriptor),
            None => (descriptor, ""),
        };

        let mut conn = Self::default();

        if !credentials.is_empty() {
            let (username, password) = credentials.split_once(':').unwrap_or((credentials, ""));
            if username.trim().is_empty() {
                return Err(IpmiError::config(
                    "connection descriptor has credentials but no username",
                ));
            }
            conn.username = username.to_string();
            conn.password = password.to_string();
        }

        let (interface, host) = split_transport(transport)?;
        // A stray '@' or ':' here means the password itself held an '@'.
        if interface.contains(['@', ':']) {
            return Err(IpmiError::config(
                "connection descriptor has an ambiguous '@' (passwords may not contain '@')",
            ));
        }
        conn.interface = interface.to_string();
        if let Some(host) = host {
            let (host, port) = split_host_port(host)?;
            conn.host = Some(host.to_string());
            conn.port = port;
        }

        Ok(conn)
    }

    /// Value for the `server` tag.
    pub fn server_tag(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// True when this descriptor targets a remote BMC.
    pub fn is_remote(&self) -> bool {
        self.host.is_some()
    }

    /// Re-encode into descriptor form. The result carries the password.
    pub fn to_descriptor(&self) -> String {
        let mut out = String::new();
        if !self.username.is_empty() {
            out.push_str(&self.username);
            if !self.password.is_empty() {
                out.push(':');
                out.push_str(&self.password);
            }
        }
        if !self.interface.is_empty() || self.host.is_some() {
            if !out.is_empty() {
                out.push('@');
            }
            out.push_str(&self.interface);
            if let Some(host) = &self.host {
                out.push('(');
                match (host.contains(':'), self.port) {
                    (true, Some(port)) => out.push_str(&format!("[{}]:{}", host, port)),
                    (false, Some(port)) => out.push_str(&format!("{}:{}", host, port)),
                    (_, None) => out.push_str(host),
                }
                out.push(')');
            }
        }
        out
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = IpmiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Hand-written so the password never reaches logs through `{:?}`.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "REDACTED" })
            .field("interface", &self.interface)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Split `interface(host)` into its parts.
fn split_transport(transport: &str) -> Result<(&str, Option<&str>)> {
    let transport = transport.trim();
    let open = transport.find('(');
    let close = transport.find(')');

    match (open, close) {
        (None, None) => Ok((transport, None)),
        (Some(open), Some(close)) => {
            let balanced = open < close
                && close == transport.len() - 1
                && transport.matches('(').count() == 1
                && transport.matches(')').count() == 1;
            if !balanced {
                return Err(unbalanced());
            }
            let host = transport[open + 1..close].trim();
            let host = if host.is_empty() { None } else { Some(host) };
            Ok((transport[..open].trim(), host))
        }
        _ => Err(unbalanced()),
    }
}

// Error messages never echo descriptor text: it may hold password fragments.
fn unbalanced() -> IpmiError {
    IpmiError::config("unbalanced parentheses in connection target")
}

/// Split an optional port off the host.
///
/// Accepts `host`, `host:623` and `[v6addr]:623`. A bare IPv6 address
/// (several colons, no brackets) is taken as a host without a port.
fn split_host_port(host: &str) -> Result<(&str, Option<u16>)> {
    if let Some(rest) = host.strip_prefix('[') {
        let (addr, after) = rest
            .split_once(']')
            .ok_or_else(|| IpmiError::config("unterminated '[' in connection host"))?;
        return match after.strip_prefix(':') {
            Some(port) => Ok((addr, Some(parse_port(port)?))),
            None if after.is_empty() => Ok((addr, None)),
            None => Err(IpmiError::config("unexpected text after ']' in connection host")),
        };
    }

    if host.matches(':').count() == 1 {
        if let Some((addr, port)) = host.split_once(':') {
            return Ok((addr, Some(parse_port(port)?)));
        }
    }

    Ok((host, None))
}

fn parse_port(port: &str) -> Result<u16> {
    port.trim()
        .parse::<u16>()
        .map_err(|_| IpmiError::config("invalid port in connection target"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let conn = ConnectionDescriptor::parse("USERID:PASSW0RD@lan(192.168.1.1)").unwrap();
        assert_eq!(conn.username, "USERID");
        assert_eq!(conn.password, "PASSW0RD");
        assert_eq!(conn.interface, "lan");
        assert_eq!(conn.host.as_deref(), Some("192.168.1.1"));
        assert_eq!(conn.port, None);
        assert_eq!(conn.server_tag(), Some("192.168.1.1"));
    }

    #[test]
    fn test_round_trip() {
        for descriptor in [
            "USERID:PASSW0RD@lan(192.168.1.1)",
            "admin:secret@lanplus(bmc.example.com)",
            "root:pa:ss@lanplus(10.0.0.5:623)",
            "admin:x@lanplus([fe80::1]:623)",
            "admin:secret",
        ] {
            let conn = ConnectionDescriptor::parse(descriptor).unwrap();
            let again = ConnectionDescriptor::parse(&conn.to_descriptor()).unwrap();
            assert_eq!(conn, again, "round trip of {}", descriptor);
        }
    }

    #[test]
    fn test_credentials_only() {
        let conn = ConnectionDescriptor::parse("admin:secret").unwrap();
        assert_eq!(conn.username, "admin");
        assert_eq!(conn.password, "secret");
        assert!(conn.interface.is_empty());
        assert!(conn.host.is_none());
        assert!(!conn.is_remote());
    }

    #[test]
    fn test_empty_descriptor() {
        let conn = ConnectionDescriptor::parse("").unwrap();
        assert_eq!(conn, ConnectionDescriptor::default());
        assert!(conn.server_tag().is_none());
    }

    #[test]
    fn test_password_split_on_first_colon() {
        let conn = ConnectionDescriptor::parse("root:pa:ss@lan(h)").unwrap();
        assert_eq!(conn.username, "root");
        assert_eq!(conn.password, "pa:ss");
    }

    #[test]
    fn test_user_without_password() {
        let conn = ConnectionDescriptor::parse("root@lanplus(h)").unwrap();
        assert_eq!(conn.username, "root");
        assert!(conn.password.is_empty());
    }

    #[test]
    fn test_transport_without_credentials() {
        let conn = ConnectionDescriptor::parse("lanplus(10.1.1.1)").unwrap();
        assert!(conn.username.is_empty());
        assert_eq!(conn.interface, "lanplus");
        assert_eq!(conn.host.as_deref(), Some("10.1.1.1"));

        let conn = ConnectionDescriptor::parse("admin:x@(10.1.1.1)").unwrap();
        assert!(conn.interface.is_empty());
        assert_eq!(conn.host.as_deref(), Some("10.1.1.1"));

        let conn = ConnectionDescriptor::parse("admin:x@lan").unwrap();
        assert_eq!(conn.interface, "lan");
        assert!(conn.host.is_none());
    }

    #[test]
    fn test_port_suffix() {
        let conn = ConnectionDescriptor::parse("a:b@lanplus(10.0.0.5:623)").unwrap();
        assert_eq!(conn.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(conn.port, Some(623));

        let conn = ConnectionDescriptor::parse("a:b@lanplus([fe80::1]:6230)").unwrap();
        assert_eq!(conn.host.as_deref(), Some("fe80::1"));
        assert_eq!(conn.port, Some(6230));

        let conn = ConnectionDescriptor::parse("a:b@lanplus(fe80::1)").unwrap();
        assert_eq!(conn.host.as_deref(), Some("fe80::1"));
        assert_eq!(conn.port, None);

        assert!(ConnectionDescriptor::parse("a:b@lan(host:notaport)").is_err());
    }

    #[test]
    fn test_missing_username() {
        let err = ConnectionDescriptor::parse(":secret@lan(h)").unwrap_err();
        assert!(matches!(err, IpmiError::Config { .. }));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        for descriptor in [
            "a:b@lan(192.168.1.1",
            "a:b@lan192.168.1.1)",
            "a:b@lan)192.168.1.1(",
            "a:b@lan((h))",
            "a:b@lan(h)trailing",
        ] {
            let err = ConnectionDescriptor::parse(descriptor).unwrap_err();
            assert!(matches!(err, IpmiError::Config { .. }), "{}", descriptor);
        }
    }

    #[test]
    fn test_password_with_at_sign_is_rejected() {
        let err = ConnectionDescriptor::parse("root:p@ssw0rd@lanplus(10.0.0.1)").unwrap_err();
        assert!(matches!(err, IpmiError::Config { .. }));
        assert!(!err.to_string().contains("ssw0rd"));

        assert!(ConnectionDescriptor::parse("root:p@ss:w0rd").is_err());
    }

    #[test]
    fn test_errors_do_not_echo_descriptor() {
        for descriptor in [
            "root:p@ss(w0rd@lan(h)",
            "root:pw@lan(h:s3cr3t)",
            "root:pw@lan([s3cr3t)",
            "root:pw@lan([h]s3cr3t)",
        ] {
            let err = ConnectionDescriptor::parse(descriptor).unwrap_err();
            let message = err.to_string();
            assert!(!message.contains("w0rd"), "{}", message);
            assert!(!message.contains("s3cr3t"), "{}", message);
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let conn = ConnectionDescriptor::parse("admin:hunter2@lan(h)").unwrap();
        let debug = format!("{:?}", conn);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }
}
