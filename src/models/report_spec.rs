//! Report request filters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;
use crate::error::{ReportError, ReportResult};

/// Filters for one report generation call
///
/// Every field is optional. The literal `"all"` (any case) and blank strings mean the same as
/// an absent field; [`ReportSpec::normalized`] folds them away so composers only ever see
/// `None` for an unset dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    #[serde(default, alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
    #[serde(default, alias = "doctor_id")]
    pub doctor_id: Option<String>,
    #[serde(default, alias = "patient_id")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ReportSpec {
    pub fn normalized(self) -> Self {
        Self {
            start_date: normalize_field(self.start_date),
            end_date: normalize_field(self.end_date),
            doctor_id: normalize_field(self.doctor_id),
            patient_id: normalize_field(self.patient_id),
            status: normalize_field(self.status),
        }
    }

    pub fn require_patient_id(&self) -> ReportResult<&str> {
        self.patient_id
            .as_deref()
            .ok_or_else(|| ReportError::Precondition("patient_id".to_string()))
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(de::parse_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(de::parse_date)
    }

    /// Inclusive date-range check, applied only when both bounds are set
    pub fn contains_date(&self, date: Option<NaiveDate>) -> bool {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => date.map(|d| d >= start && d <= end).unwrap_or(false),
            _ => true,
        }
    }

    /// Query parameters for the filtered endpoints, unset dimensions omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("doctorId", &self.doctor_id),
            ("patientId", &self.patient_id),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_normalizes_to_absent() {
        let spec = ReportSpec {
            doctor_id: Some("ALL".into()),
            status: Some("  ".into()),
            patient_id: Some("7".into()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(spec.doctor_id, None);
        assert_eq!(spec.status, None);
        assert_eq!(spec.patient_id.as_deref(), Some("7"));
        assert_eq!(spec, ReportSpec { patient_id: Some("7".into()), ..Default::default() });
    }

    #[test]
    fn test_require_patient_id() {
        let spec = ReportSpec { patient_id: Some("all".into()), ..Default::default() }.normalized();
        assert!(matches!(spec.require_patient_id(), Err(ReportError::Precondition(_))));
    }

    #[test]
    fn test_camel_case_and_snake_case_accepted() {
        let a: ReportSpec = serde_json::from_str(r#"{"startDate": "2024-01-01", "doctorId": "3"}"#).unwrap();
        let b: ReportSpec = serde_json::from_str(r#"{"start_date": "2024-01-01", "doctor_id": "3"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_contains_date_needs_both_bounds() {
        let open = ReportSpec { start_date: Some("2024-01-10".into()), ..Default::default() };
        assert!(open.contains_date(None));

        let closed = ReportSpec {
            start_date: Some("2024-01-10".into()),
            end_date: Some("2024-01-20".into()),
            ..Default::default()
        };
        assert!(closed.contains_date(NaiveDate::from_ymd_opt(2024, 1, 10)));
        assert!(closed.contains_date(NaiveDate::from_ymd_opt(2024, 1, 20)));
        assert!(!closed.contains_date(NaiveDate::from_ymd_opt(2024, 1, 21)));
        assert!(!closed.contains_date(None));
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let spec = ReportSpec {
            start_date: Some("2024-01-01".into()),
            status: Some("completed".into()),
            ..Default::default()
        };
        assert_eq!(
            spec.query_pairs(),
            vec![("startDate", "2024-01-01".to_string()), ("status", "completed".to_string())]
        );
    }
}
