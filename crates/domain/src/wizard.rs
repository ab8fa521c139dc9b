//! Multi-step agreement creation wizard.
//!
//! Each step validates only its own fields; progression is blocked until the
//! current step is clean. Terms recompute the end date whenever the start
//! date or duration changes.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agreement::{
    Address, AgreementTerms, Customer, DEFAULT_NOTICE_PERIOD_MONTHS, DEFAULT_RENT_DUE_DAY,
    MobileNumber, NewAgreement, PartyDetails, PropertyDetails, tenancy_end_date,
};

/// Longest tenancy the wizard accepts.
pub const MAX_DURATION_MONTHS: u16 = 120;

/// Wizard steps in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Owner details.
    Owner,
    /// Tenant details.
    Tenant,
    /// Property details.
    Property,
    /// Rent, deposit and dates.
    Terms,
    /// Final review before submission.
    Review,
}

impl WizardStep {
    /// Returns all steps in order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Owner,
            Self::Tenant,
            Self::Property,
            Self::Terms,
            Self::Review,
        ]
    }

    /// Returns the following step.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Owner => Some(Self::Tenant),
            Self::Tenant => Some(Self::Property),
            Self::Property => Some(Self::Terms),
            Self::Terms => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// Returns the preceding step.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Owner => None,
            Self::Tenant => Some(Self::Owner),
            Self::Property => Some(Self::Tenant),
            Self::Terms => Some(Self::Property),
            Self::Review => Some(Self::Terms),
        }
    }
}

/// Party slot filled by a customer lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    /// Property owner.
    Owner,
    /// Tenant.
    Tenant,
}

/// Field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted field path, e.g. `owner.mobile`.
    pub field: String,
    /// Operator-facing message.
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}: {}", self.field, self.message)
    }
}

/// Address being entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDraft {
    /// Street line.
    pub line1: Option<String>,
    /// Locality line.
    pub line2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Postal code.
    pub pincode: Option<String>,
}

impl AddressDraft {
    fn validate(&self, prefix: &str, errors: &mut Vec<FieldError>) {
        require_text(&self.line1, &format!("{prefix}.line1"), errors);
        require_text(&self.city, &format!("{prefix}.city"), errors);

        match filled(&self.pincode) {
            None => errors.push(FieldError::new(format!("{prefix}.pincode"), "required")),
            Some(pincode)
                if pincode.len() != 6
                    || !pincode.chars().all(|character| character.is_ascii_digit()) =>
            {
                errors.push(FieldError::new(
                    format!("{prefix}.pincode"),
                    "must be 6 digits",
                ));
            }
            Some(_) => {}
        }
    }

    fn to_address(&self) -> Address {
        Address {
            line1: filled(&self.line1).unwrap_or_default().to_owned(),
            line2: filled(&self.line2).map(str::to_owned),
            city: filled(&self.city).unwrap_or_default().to_owned(),
            state: filled(&self.state).unwrap_or_default().to_owned(),
            pincode: filled(&self.pincode).unwrap_or_default().to_owned(),
        }
    }
}

impl From<&Address> for AddressDraft {
    fn from(value: &Address) -> Self {
        let some = |text: &str| Some(text.to_owned()).filter(|text| !text.trim().is_empty());
        Self {
            line1: some(&value.line1),
            line2: value.line2.clone(),
            city: some(&value.city),
            state: some(&value.state),
            pincode: some(&value.pincode),
        }
    }
}

/// Owner or tenant being entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDraft {
    /// Full name.
    pub name: Option<String>,
    /// Mobile number as typed.
    pub mobile: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Address. Only validated for the owner.
    pub address: AddressDraft,
}

impl PartyDraft {
    fn validate(&self, prefix: &str, with_address: bool, errors: &mut Vec<FieldError>) {
        require_text(&self.name, &format!("{prefix}.name"), errors);

        match filled(&self.mobile) {
            None => errors.push(FieldError::new(format!("{prefix}.mobile"), "required")),
            Some(mobile) => {
                if MobileNumber::new(mobile).is_err() {
                    errors.push(FieldError::new(
                        format!("{prefix}.mobile"),
                        "must be a 10-digit mobile number",
                    ));
                }
            }
        }

        if let Some(email) = filled(&self.email) {
            if !email.contains('@') {
                errors.push(FieldError::new(format!("{prefix}.email"), "is not valid"));
            }
        }

        if with_address {
            self.address
                .validate(&format!("{prefix}.address"), errors);
        }
    }

    fn to_details(&self) -> Option<PartyDetails> {
        Some(PartyDetails {
            name: filled(&self.name)?.to_owned(),
            mobile: MobileNumber::new(filled(&self.mobile)?).ok()?,
            email: filled(&self.email).map(str::to_owned),
            address: self.address.to_address(),
        })
    }
}

/// Premises being entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDraft {
    /// Property type.
    pub property_type: Option<String>,
    /// Premises address.
    pub address: AddressDraft,
    /// Area in square feet.
    pub area_sqft: Option<u32>,
    /// Furnishing status.
    pub furnishing: Option<String>,
}

/// Terms being entered. `end_date` is derived, never typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsDraft {
    start_date: Option<NaiveDate>,
    duration_months: Option<u16>,
    end_date: Option<NaiveDate>,
    /// Monthly rent.
    pub monthly_rent: Option<u64>,
    /// Refundable deposit.
    pub security_deposit: Option<u64>,
    /// Monthly maintenance.
    pub maintenance_charge: Option<u64>,
    /// Notice period in months.
    pub notice_period_months: Option<u8>,
    /// Rent due day of month.
    pub rent_due_day: Option<u8>,
}

impl TermsDraft {
    /// Sets the start date and recomputes the end date.
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
        self.recalculate_end_date();
    }

    /// Sets the duration and recomputes the end date.
    pub fn set_duration_months(&mut self, duration_months: Option<u16>) {
        self.duration_months = duration_months;
        self.recalculate_end_date();
    }

    /// Returns the start date.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the duration in months.
    #[must_use]
    pub fn duration_months(&self) -> Option<u16> {
        self.duration_months
    }

    /// Returns the derived end date.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    fn recalculate_end_date(&mut self) {
        self.end_date = match (self.start_date, self.duration_months) {
            (Some(start_date), Some(months)) if (1..=MAX_DURATION_MONTHS).contains(&months) => {
                tenancy_end_date(start_date, months)
            }
            _ => None,
        };
    }

    fn validate(&self, errors: &mut Vec<FieldError>) {
        if self.start_date.is_none() {
            errors.push(FieldError::new("terms.start_date", "required"));
        }

        match self.duration_months {
            None => errors.push(FieldError::new("terms.duration_months", "required")),
            Some(months) if !(1..=MAX_DURATION_MONTHS).contains(&months) => {
                errors.push(FieldError::new(
                    "terms.duration_months",
                    format!("must be between 1 and {MAX_DURATION_MONTHS}"),
                ));
            }
            Some(_) => {}
        }

        match self.monthly_rent {
            None => errors.push(FieldError::new("terms.monthly_rent", "required")),
            Some(0) => errors.push(FieldError::new(
                "terms.monthly_rent",
                "must be greater than zero",
            )),
            Some(_) => {}
        }

        if let Some(day) = self.rent_due_day {
            if !(1..=28).contains(&day) {
                errors.push(FieldError::new(
                    "terms.rent_due_day",
                    "must be between 1 and 28",
                ));
            }
        }
    }

    fn to_terms(&self) -> Option<AgreementTerms> {
        Some(AgreementTerms {
            start_date: self.start_date?,
            end_date: self.end_date?,
            duration_months: self.duration_months?,
            monthly_rent: self.monthly_rent?,
            security_deposit: self.security_deposit.unwrap_or_default(),
            maintenance_charge: self.maintenance_charge,
            notice_period_months: self
                .notice_period_months
                .unwrap_or(DEFAULT_NOTICE_PERIOD_MONTHS),
            rent_due_day: self.rent_due_day.unwrap_or(DEFAULT_RENT_DUE_DAY),
        })
    }
}

/// Everything entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementDraft {
    /// Owner party.
    pub owner: PartyDraft,
    /// Tenant party.
    pub tenant: PartyDraft,
    /// Premises.
    pub property: PropertyDraft,
    /// Terms.
    pub terms: TermsDraft,
    /// Document language; defaults to `english`.
    pub language: Option<String>,
}

impl AgreementDraft {
    /// Validates the fields owned by one step.
    #[must_use]
    pub fn validate_step(&self, step: WizardStep) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match step {
            WizardStep::Owner => self.owner.validate("owner", true, &mut errors),
            WizardStep::Tenant => self.tenant.validate("tenant", false, &mut errors),
            WizardStep::Property => {
                require_text(
                    &self.property.property_type,
                    "property.property_type",
                    &mut errors,
                );
                self.property.address.validate("property.address", &mut errors);
            }
            WizardStep::Terms => self.terms.validate(&mut errors),
            WizardStep::Review => {}
        }
        errors
    }

    /// Validates every step.
    #[must_use]
    pub fn validate_all(&self) -> Vec<FieldError> {
        WizardStep::all()
            .iter()
            .flat_map(|step| self.validate_step(*step))
            .collect()
    }

    /// Copies a looked-up customer into a party slot.
    pub fn apply_customer(&mut self, role: PartyRole, customer: &Customer) {
        let party = match role {
            PartyRole::Owner => &mut self.owner,
            PartyRole::Tenant => &mut self.tenant,
        };
        party.name = Some(customer.name.clone());
        party.mobile = Some(customer.mobile.as_str().to_owned());
        party.email = customer.email.clone();
        party.address = AddressDraft::from(&customer.address);
    }

    /// Builds the creation payload when every step validates.
    pub fn to_new_agreement(&self) -> Result<NewAgreement, Vec<FieldError>> {
        let errors = self.validate_all();
        if !errors.is_empty() {
            return Err(errors);
        }

        let incomplete = || vec![FieldError::new("draft", "is incomplete")];
        Ok(NewAgreement {
            owner: self.owner.to_details().ok_or_else(incomplete)?,
            tenant: self.tenant.to_details().ok_or_else(incomplete)?,
            property: PropertyDetails {
                property_type: filled(&self.property.property_type)
                    .unwrap_or_default()
                    .to_owned(),
                address: self.property.address.to_address(),
                area_sqft: self.property.area_sqft,
                furnishing: filled(&self.property.furnishing).map(str::to_owned),
            },
            terms: self.terms.to_terms().ok_or_else(incomplete)?,
            language: filled(&self.language)
                .unwrap_or("english")
                .to_lowercase(),
        })
    }
}

/// Step cursor over an [`AgreementDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementWizard {
    step: WizardStep,
    draft: AgreementDraft,
    errors: Vec<FieldError>,
}

impl Default for AgreementWizard {
    fn default() -> Self {
        Self::new(AgreementDraft::default())
    }
}

impl AgreementWizard {
    /// Starts the wizard on the first step.
    #[must_use]
    pub fn new(draft: AgreementDraft) -> Self {
        Self {
            step: WizardStep::Owner,
            draft,
            errors: Vec::new(),
        }
    }

    /// Returns the current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Returns the draft.
    #[must_use]
    pub fn draft(&self) -> &AgreementDraft {
        &self.draft
    }

    /// Returns the draft for editing.
    pub fn draft_mut(&mut self) -> &mut AgreementDraft {
        &mut self.draft
    }

    /// Returns errors from the last blocked advance.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        self.errors.as_slice()
    }

    /// Moves forward when the current step validates.
    pub fn advance(&mut self) -> Result<WizardStep, Vec<FieldError>> {
        let errors = self.draft.validate_step(self.step);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back without validating.
    pub fn back(&mut self) -> WizardStep {
        self.errors.clear();
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn require_text(value: &Option<String>, field: &str, errors: &mut Vec<FieldError>) {
    if filled(value).is_none() {
        errors.push(FieldError::new(field, "required"));
    }
}
