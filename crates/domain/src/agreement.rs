//! Rental agreement records exchanged with the directory service.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use leasedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates the identifier from its storage value.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the storage value.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Stable identifier of an agreement.
    AgreementId
);
numeric_id!(
    /// Stable identifier of a customer.
    CustomerId
);

/// Ten-digit mobile number without country prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Normalizes and validates a mobile number.
    ///
    /// Spaces and dashes are ignored; a leading `+91` or `0` is stripped.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let digits: String = value
            .as_ref()
            .chars()
            .filter(|character| !matches!(character, ' ' | '-'))
            .collect();
        let digits = digits
            .strip_prefix("+91")
            .or_else(|| digits.strip_prefix('0'))
            .unwrap_or(digits.as_str());

        if digits.len() != 10 || !digits.chars().all(|character| character.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "mobile number '{}' must contain exactly 10 digits",
                value.as_ref()
            )));
        }

        Ok(Self(digits.to_owned()))
    }

    /// Returns the ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MobileNumber> for String {
    fn from(value: MobileNumber) -> Self {
        value.0
    }
}

impl Display for MobileNumber {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Postal address; absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    /// Flat, house or street line.
    pub line1: String,
    /// Optional locality line.
    pub line2: Option<String>,
    /// City or town.
    pub city: String,
    /// State.
    pub state: String,
    /// Six-digit postal code.
    pub pincode: String,
}

/// Customer known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer identifier.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Primary mobile number.
    pub mobile: MobileNumber,
    /// Optional email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Address,
}

/// Owner or tenant details printed on an agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetails {
    /// Full name.
    pub name: String,
    /// Mobile number.
    pub mobile: MobileNumber,
    /// Optional email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Address,
}

/// Rented premises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    /// Free-form type such as `2BHK flat`.
    pub property_type: String,
    /// Premises address.
    pub address: Address,
    /// Carpet area in square feet.
    pub area_sqft: Option<u32>,
    /// Furnishing status.
    pub furnishing: Option<String>,
}

/// Commercial terms. Amounts are whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementTerms {
    /// First day of the tenancy.
    pub start_date: NaiveDate,
    /// Last day of the tenancy.
    pub end_date: NaiveDate,
    /// Tenancy length in months.
    pub duration_months: u16,
    /// Monthly rent.
    pub monthly_rent: u64,
    /// Refundable deposit.
    pub security_deposit: u64,
    /// Monthly maintenance, when charged separately.
    pub maintenance_charge: Option<u64>,
    /// Notice period in months.
    pub notice_period_months: u8,
    /// Day of month rent falls due.
    pub rent_due_day: u8,
}

/// Default notice period when none is entered.
pub const DEFAULT_NOTICE_PERIOD_MONTHS: u8 = 1;

/// Default rent due day when none is entered.
pub const DEFAULT_RENT_DUE_DAY: u8 = 5;

/// Returns the last day of a tenancy of `duration_months` starting on `start_date`.
#[must_use]
pub fn tenancy_end_date(start_date: NaiveDate, duration_months: u16) -> Option<NaiveDate> {
    start_date
        .checked_add_months(Months::new(u32::from(duration_months)))?
        .pred_opt()
}

/// Agreement lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    /// Created but not yet executed.
    #[default]
    Draft,
    /// In force.
    Active,
    /// Past its end date.
    Expired,
    /// Ended early.
    Terminated,
    /// Superseded by a renewal.
    Renewed,
}

impl AgreementStatus {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
            Self::Renewed => "renewed",
        }
    }
}

impl FromStr for AgreementStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "terminated" => Ok(Self::Terminated),
            "renewed" => Ok(Self::Renewed),
            _ => Err(AppError::Validation(format!(
                "unknown agreement status '{value}'"
            ))),
        }
    }
}

/// Payload for creating an agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgreement {
    /// Owner party.
    pub owner: PartyDetails,
    /// Tenant party.
    pub tenant: PartyDetails,
    /// Rented premises.
    pub property: PropertyDetails,
    /// Commercial terms.
    pub terms: AgreementTerms,
    /// Document language code, e.g. `english`.
    pub language: String,
}

/// Persisted agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    /// Agreement identifier.
    pub id: AgreementId,
    /// Human-facing number such as `AGR-2025-0042`.
    pub agreement_number: String,
    /// Lifecycle status.
    pub status: AgreementStatus,
    /// Owner party.
    pub owner: PartyDetails,
    /// Tenant party.
    pub tenant: PartyDetails,
    /// Rented premises.
    pub property: PropertyDetails,
    /// Commercial terms.
    pub terms: AgreementTerms,
    /// Document language code.
    pub language: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{AgreementStatus, MobileNumber, tenancy_end_date};

    #[test]
    fn mobile_number_strips_prefixes() {
        let number = MobileNumber::new("+91 98765-43210");
        assert_eq!(
            number.map(String::from).unwrap_or_default(),
            "9876543210"
        );
        assert!(MobileNumber::new("12345").is_err());
    }

    #[test]
    fn eleven_month_tenancy_ends_day_before_anniversary() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1);
        let end = start.and_then(|start| tenancy_end_date(start, 11));
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 11, 30));
    }

    #[test]
    fn month_end_start_clamps_to_shorter_months() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31);
        let end = start.and_then(|start| tenancy_end_date(start, 1));
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 27));
    }

    #[test]
    fn status_roundtrips_transport_value() {
        let parsed = "terminated".parse::<AgreementStatus>();
        assert_eq!(parsed.ok(), Some(AgreementStatus::Terminated));
        assert!("archived".parse::<AgreementStatus>().is_err());
    }
}
