//! Site context: zoning, BCMS building-control notices and property sales

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::GeoLocation;

/// Development-plan zoning at a point
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningInfo {
    pub zone_code: String,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub development_plan: Option<String>,
    #[serde(default)]
    pub planning_authority: Option<String>,
    #[serde(default)]
    pub permitted_uses: Vec<String>,
    #[serde(default)]
    pub open_for_consideration: Vec<String>,
}

impl ZoningInfo {
    /// Case-insensitive check against the permitted-in-principle list
    #[must_use]
    pub fn permits(&self, use_class: &str) -> bool {
        self.permitted_uses
            .iter()
            .any(|u| u.eq_ignore_ascii_case(use_class))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcmsNoticeType {
    Commencement,
    SevenDay,
    Completion,
    #[default]
    #[serde(other)]
    Other,
}

/// A Building Control Management System notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BcmsNotice {
    pub id: String,
    #[serde(default)]
    pub application_number: Option<String>,
    #[serde(default)]
    pub notice_type: BcmsNoticeType,
    #[serde(default)]
    pub submitted_date: Option<NaiveDate>,
    #[serde(default)]
    pub commencement_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A sale from the residential property price register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySale {
    pub address: String,
    #[serde(alias = "price")]
    pub price_eur: f64,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub is_new_dwelling: bool,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoning_permits_is_case_insensitive() {
        let zoning = ZoningInfo {
            zone_code: "Z1".to_string(),
            permitted_uses: vec!["Residential".to_string()],
            ..Default::default()
        };
        assert!(zoning.permits("residential"));
        assert!(!zoning.permits("industrial"));
    }

    #[test]
    fn bcms_unknown_notice_type_maps_to_other() {
        let notice: BcmsNotice =
            serde_json::from_str(r#"{"id":"b1","noticeType":"opt_out"}"#).unwrap();
        assert_eq!(notice.notice_type, BcmsNoticeType::Other);
    }

    #[test]
    fn property_sale_accepts_price_alias() {
        let sale: PropertySale = serde_json::from_str(
            r#"{"address":"4 Elm Grove, Cork","price":325000,"saleDate":"2023-09-14"}"#,
        )
        .unwrap();
        assert!((sale.price_eur - 325_000.0).abs() < f64::EPSILON);
        assert!(!sale.is_new_dwelling);
    }
}
