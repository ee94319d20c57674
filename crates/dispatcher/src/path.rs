//! Namespace path construction
//!
//! Backends identify a series by a dot-delimited path concatenated from an
//! ordered field list. Optional fields may be empty, so the raw join is
//! fixed up afterwards: no leading separator, no trailing separator, no
//! doubled separators.

use contracts::{MetricRecord, PathField};

const SEPARATOR: char = '.';

/// Characters the TCP time-series protocols cannot carry in a path segment
const INVALID_CHARS: &str = r"~!$:;%^*()+={}[]|\/<>";

/// Join the named fields of `record` in order
pub fn build_path(fields: &[PathField], record: &MetricRecord) -> String {
    let mut path = String::new();
    for field in fields {
        path.push_str(field.value_of(record));
        path.push(SEPARATOR);
    }
    collapse_separators(&path)
}

/// Replace whitespace and protocol-invalid characters with `replacement`
pub fn sanitize(s: &str, replacement: char) -> String {
    s.chars()
        .map(|c| {
            if c.is_whitespace() || INVALID_CHARS.contains(c) {
                replacement
            } else {
                c
            }
        })
        .collect()
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = true; // drops leading separators too
    for c in path.chars() {
        if c == SEPARATOR {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(c);
    }
    if out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prefix: &str, host: &str, postfix: &str, label: &str) -> MetricRecord {
        let mut m = MetricRecord::new();
        m.prefix = prefix.to_string();
        m.host_name = host.to_string();
        m.postfix = postfix.to_string();
        m.label = label.to_string();
        m
    }

    const FIELDS: &[PathField] = &[
        PathField::Prefix,
        PathField::Hostname,
        PathField::Postfix,
        PathField::Label,
    ];

    #[test]
    fn test_empty_optional_fields_leave_no_stray_dots() {
        let path = build_path(FIELDS, &record("", "h", "", "x"));
        assert_eq!(path, "h.x");
    }

    #[test]
    fn test_all_fields_present() {
        let path = build_path(FIELDS, &record("mon.dc1", "db01", "mysql", "connection_time"));
        assert_eq!(path, "mon.dc1.db01.mysql.connection_time");
    }

    #[test]
    fn test_all_fields_empty() {
        assert_eq!(build_path(FIELDS, &record("", "", "", "")), "");
    }

    #[test]
    fn test_sanitize_replaces_invalid_chars_and_whitespace() {
        assert_eq!(sanitize(r"a b:c\d", '_'), "a_b_c_d");
        assert_eq!(sanitize("pl=0%", '_'), "pl_0_");
        // dots are the separator, never replaced here
        assert_eq!(sanitize("mon.dc1.db01", '_'), "mon.dc1.db01");
    }
}
