//! Column layout of the contract list export.
//!
//! The positional engine addresses columns by the zero-based indices below.
//! The name-addressed filters and mappers use the header constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub const MANAGEMENT_NO: usize = 0;
pub const RESIDENCE_STATUS: usize = 14;
pub const DELINQUENT_STATUS: usize = 15;
pub const PROPERTY_NO: usize = 16;
pub const CONTRACT_NAME: usize = 20;
pub const CONTRACT_KANA: usize = 21;
pub const TEL_HOME: usize = 26;
pub const TEL_MOBILE: usize = 27;
pub const TEL_HOME_1: usize = 45;
pub const TEL_MOBILE_1: usize = 46;
pub const EMERGENCY_CONTACT_NAME: usize = 53;
pub const TEL_MOBILE_2: usize = 56;
pub const DEBT_AMOUNT: usize = 71;
pub const PAYMENT_DATE: usize = 72;
pub const PAYMENT_AMOUNT: usize = 73;
pub const COLLECTION_RANK: usize = 86;
pub const PROPERTY_NAME: usize = 95;
pub const CLIENT_CD: usize = 97;
pub const CLIENT_NAME: usize = 98;
pub const TRUSTEE_ID: usize = 118;

/// Header names used by the name-addressed pipelines.
pub mod header {
    pub const MANAGEMENT_NO: &str = "管理番号";
    pub const RESIDENCE_STATUS: &str = "入居ステータス";
    pub const DELINQUENT_STATUS: &str = "滞納ステータス";
    pub const CONTRACT_KANA: &str = "契約者カナ";
    pub const TEL_MOBILE: &str = "TEL携帯";
    pub const TEL_MOBILE_1: &str = "TEL携帯.1";
    pub const TEL_MOBILE_2: &str = "TEL携帯.2";
    pub const EMERGENCY_MOBILE: &str = "緊急連絡人１のTEL（携帯）";
    pub const DEBT_AMOUNT: &str = "滞納残債";
    pub const PAYMENT_DATE: &str = "入金予定日";
    pub const PAYMENT_AMOUNT: &str = "入金予定金額";
    pub const COLLECTION_RANK: &str = "回収ランク";
    pub const PROPERTY_NAME: &str = "物件名";
    pub const CLIENT_CD: &str = "クライアントCD";
    pub const CLIENT_NAME: &str = "クライアント名";
    pub const TRUSTEE_ID: &str = "委託先法人ID";
}

/// Whose phone number an autocall list dials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneTarget {
    Contract,
    Guarantor,
    EmergencyContact,
}

impl PhoneTarget {
    pub const ALL: [PhoneTarget; 3] = [
        PhoneTarget::Contract,
        PhoneTarget::Guarantor,
        PhoneTarget::EmergencyContact,
    ];

    /// Mobile number position in the contract list.
    pub fn mobile_index(self) -> usize {
        match self {
            PhoneTarget::Contract => TEL_MOBILE,
            PhoneTarget::Guarantor => TEL_MOBILE_1,
            PhoneTarget::EmergencyContact => TEL_MOBILE_2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhoneTarget::Contract => "契約者",
            PhoneTarget::Guarantor => "保証人",
            PhoneTarget::EmergencyContact => "緊急連絡人",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhoneTarget::Contract => "contract",
            PhoneTarget::Guarantor => "guarantor",
            PhoneTarget::EmergencyContact => "emergency_contact",
        }
    }
}

impl fmt::Display for PhoneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhoneTarget {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contract" => Ok(PhoneTarget::Contract),
            "guarantor" => Ok(PhoneTarget::Guarantor),
            "emergency" | "emergency_contact" => Ok(PhoneTarget::EmergencyContact),
            other => Err(FeedError::InvalidConfig(format!(
                "unknown phone target: {other}"
            ))),
        }
    }
}
