//! Sink implementations
//!
//! One module per wire protocol: line text over TCP, length-prefixed binary
//! batches over TCP, statsd datagrams, the HTTP gauge API, and the stdout
//! echo.

mod binary;
mod console;
mod http;
mod line;
mod statsd;
mod tcp;

pub use self::binary::BinarySink;
pub use self::console::ConsoleSink;
pub use self::http::HttpSink;
pub use self::line::LineSink;
pub use self::statsd::StatsdSink;
pub use self::tcp::TcpSinkConfig;

use std::collections::HashMap;
use std::str::FromStr;

use contracts::RelayError;

/// Parse a comma-separated `host[:port]` list, falling back to localhost.
///
/// A malformed port is a configuration error, not a runtime skip.
pub(crate) fn parse_servers(
    list: &str,
    default_port: u16,
) -> Result<Vec<(String, u16)>, RelayError> {
    let mut servers = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.split_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    RelayError::config_validation("servers", format!("invalid port in '{entry}'"))
                })?;
                servers.push((host.to_string(), port));
            }
            None => servers.push((entry.to_string(), default_port)),
        }
    }
    if servers.is_empty() {
        servers.push(("127.0.0.1".to_string(), default_port));
    }
    Ok(servers)
}

/// Coerce an optional string param to a number, fatal on garbage
pub(crate) fn parse_param<T: FromStr>(
    params: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, RelayError> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            RelayError::config_validation(key, format!("'{raw}' is not a valid value"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_servers_mixed_ports() {
        let servers = parse_servers("10.0.0.1:2004, 10.0.0.2 ,graphite.internal:2203", 2003)
            .unwrap();
        assert_eq!(
            servers,
            vec![
                ("10.0.0.1".to_string(), 2004),
                ("10.0.0.2".to_string(), 2003),
                ("graphite.internal".to_string(), 2203),
            ]
        );
    }

    #[test]
    fn test_parse_servers_empty_defaults_to_localhost() {
        assert_eq!(
            parse_servers("", 8125).unwrap(),
            vec![("127.0.0.1".to_string(), 8125)]
        );
    }

    #[test]
    fn test_parse_servers_bad_port_is_config_error() {
        assert!(parse_servers("10.0.0.1:chatty", 2003).is_err());
    }

    #[test]
    fn test_parse_param() {
        let mut params = HashMap::new();
        params.insert("max_metrics".to_string(), "50".to_string());
        assert_eq!(parse_param(&params, "max_metrics", 200usize).unwrap(), 50);
        assert_eq!(parse_param(&params, "missing", 7u64).unwrap(), 7);

        params.insert("floor_secs".to_string(), "often".to_string());
        assert!(parse_param(&params, "floor_secs", 15i64).is_err());
    }
}
