//! Report URLs and filters.

use std::fmt;
use std::str::FromStr;

/// Report families served under `/api/reports/<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Events,
    Equipment,
    Reservations,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Events => "events",
            ReportKind::Equipment => "equipment",
            ReportKind::Reservations => "reservations",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "events" => Ok(ReportKind::Events),
            "equipment" => Ok(ReportKind::Equipment),
            "reservations" => Ok(ReportKind::Reservations),
            other => Err(format!(
                "Unknown report: {other} (expected events, equipment or reservations)"
            )),
        }
    }
}

/// Optional report filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl ReportFilters {
    /// Query parameters in `start_date`, `end_date`, `status` order, empty
    /// values dropped.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        [
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// Endpoint path with a form-urlencoded query of the non-empty params.
///
/// No `?` is appended when there is nothing to encode.
pub fn report_endpoint<K, V>(kind: ReportKind, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if value.as_ref().is_empty() {
            continue;
        }
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    let query = serializer.finish();

    let path = format!("/api/reports/{kind}");
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// Absolute report URL under `base_url`.
pub fn report_url<K, V>(base_url: &str, kind: ReportKind, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        report_endpoint(kind, params)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_url_single_param() {
        assert_eq!(
            report_url(
                "http://localhost:8000",
                ReportKind::Events,
                &[("start_date", "2025-01-01")]
            ),
            "http://localhost:8000/api/reports/events?start_date=2025-01-01"
        );
    }

    #[test]
    fn test_report_url_without_params_has_no_question_mark() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(
            report_url("http://localhost:8000/", ReportKind::Equipment, &params),
            "http://localhost:8000/api/reports/equipment"
        );
    }

    #[test]
    fn test_report_url_skips_empty_and_encodes() {
        assert_eq!(
            report_url(
                "http://h",
                ReportKind::Reservations,
                &[("status", "in use"), ("start_date", ""), ("end_date", "2025-02-01")]
            ),
            "http://h/api/reports/reservations?status=in+use&end_date=2025-02-01"
        );
    }

    #[test]
    fn test_filters_keep_order_and_drop_blanks() {
        let filters = ReportFilters {
            start_date: Some("2025-01-01".to_string()),
            end_date: Some("  ".to_string()),
            status: Some("pending".to_string()),
        };
        assert_eq!(
            filters.params(),
            vec![
                ("start_date", "2025-01-01".to_string()),
                ("status", "pending".to_string())
            ]
        );
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Events".parse::<ReportKind>().unwrap(), ReportKind::Events);
        assert!("users".parse::<ReportKind>().is_err());
    }
}
