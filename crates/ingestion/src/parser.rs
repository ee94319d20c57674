//! PerfdataParser - spool file contents to MetricRecord batches
//!
//! Spool files are lines of tab-separated `NAME::VALUE` pairs with one or
//! two perfdata blobs embedded. Parsing is tolerant end to end: malformed
//! lines, fields and tokens are skipped with a log line, never raised.
//! Only a file that cannot be opened is fatal for that file.

use std::path::Path;
use std::sync::OnceLock;

use contracts::{MetricRecord, RelayError};
use regex::Regex;
use tracing::{debug, trace, warn};

/// Value left unexpanded by the monitoring daemon's macro processor
const UNRESOLVED_MACRO: &str = "$_";

/// One `label=value[uom];warn;crit;min;max` segment. The label is any run up
/// to `=` (quotes, spaces, colons and backslashes included), the value is the
/// leading numeric run, the unit is the trailing alpha/percent run, and
/// everything from the first `;` is thresholds we discard.
const TOKEN_PATTERN: &str = r"([^=]+?)=(-?[\d.]+)([a-zA-Z%]*)(?:;\S*)?";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern should compile"))
}

/// Parser for one spool file's contents
#[derive(Debug, Clone)]
pub struct PerfdataParser {
    replacement: char,
    require_service_desc: bool,
}

impl PerfdataParser {
    /// Create a parser with the configured replacement character and
    /// service-description mode
    pub fn new(replacement: char, require_service_desc: bool) -> Self {
        Self {
            replacement,
            require_service_desc,
        }
    }

    /// Parse one spool file into an ordered record sequence.
    ///
    /// # Errors
    /// Only a read failure is an error; the file is left untouched for the
    /// caller to retry. Malformed content never fails the call.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<MetricRecord>, RelayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::spool_read(path.display().to_string(), e.to_string()))?;
        Ok(self.parse_content(&content))
    }

    /// Parse raw spool file contents
    pub fn parse_content(&self, content: &str) -> Vec<MetricRecord> {
        let mut records = Vec::new();
        for line in content.lines() {
            if let Some(template) = self.parse_line(line) {
                records.extend(self.explode_perfdata(&template));
            }
        }
        records
    }

    /// Parse one spool line into a validated template record.
    ///
    /// Lines that do not start with a `DATATYPE::` field are partial writes
    /// or garbage and are skipped outright.
    fn parse_line(&self, line: &str) -> Option<MetricRecord> {
        if !line.starts_with("DATATYPE::") {
            trace!("skipping line without DATATYPE field");
            return None;
        }

        let mut record = MetricRecord::new();
        for field in line.split('\t') {
            let Some((name, value)) = field.split_once("::") else {
                debug!(field, "malformed spool field, skipping");
                continue;
            };
            // '/' would mint bogus namespace segments downstream
            let value = value.replace('/', &self.replacement.to_string());
            if name == "HOSTPERFDATA" || name == "SERVICEPERFDATA" {
                // verbatim: token boundaries need the whitespace
                record.set_field(name, &value);
            } else if value.starts_with(UNRESOLVED_MACRO) {
                trace!(field = name, "unexpanded macro, leaving field at default");
            } else {
                let value: String = value.split_whitespace().collect();
                record.set_field(name, &value);
            }
        }

        record.validate(self.require_service_desc);
        if record.valid {
            Some(record)
        } else {
            debug!(line, "invalid spool line, skipping");
            None
        }
    }

    /// Clone the template once per perfdata token
    fn explode_perfdata(&self, template: &MetricRecord) -> Vec<MetricRecord> {
        let mut out = Vec::new();
        for caps in token_regex().captures_iter(&template.raw_perf_data) {
            let label = caps[1].trim();
            let value = &caps[2];
            let uom = &caps[3];

            if label.is_empty() {
                debug!(perfdata = %template.raw_perf_data, "token without label, skipping");
                continue;
            }
            if value.parse::<f64>().is_err() {
                warn!(label, value, "perfdata token value is not numeric, skipping");
                continue;
            }

            let mut record = template.clone();
            record.label = self.clean_label(label);
            record.value = value.to_string();
            record.uom = uom.to_string();
            out.push(record);
        }
        if out.is_empty() {
            debug!(perfdata = %template.raw_perf_data, "no parsable perfdata tokens in line");
        }
        out
    }

    /// Whitespace and dots inside a label would split or nest the metric
    /// path, so both become the replacement character.
    fn clean_label(&self, label: &str) -> String {
        label
            .chars()
            .map(|c| {
                if c.is_whitespace() || c == '.' {
                    self.replacement
                } else {
                    c
                }
            })
            .collect()
    }
}
