use std::str::FromStr;

use leasedesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::agreement::{Agreement, AgreementTerms, PartyDetails, PropertyDetails};

/// Output selector understood by the rendering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Rendered HTML preview.
    Html,
    /// PDF bytes.
    Pdf,
    /// Word (`.docx`) bytes.
    #[serde(rename = "docx")]
    Word,
}

impl DocumentFormat {
    /// Returns the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Word => "docx",
        }
    }

    /// Returns the content type used when the service omits one.
    #[must_use]
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Returns the conventional file extension.
    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for DocumentFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "docx" | "word" => Ok(Self::Word),
            other => Err(AppError::Validation(format!(
                "unknown document format '{other}'"
            ))),
        }
    }
}

/// Template identifier known to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTemplateId(NonEmptyString);

impl DocumentTemplateId {
    /// Creates a template identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Structured data substituted into an agreement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDocumentData {
    /// Agreement number.
    pub agreement_number: String,
    /// Document language.
    pub language: String,
    /// Owner party.
    pub owner: PartyDetails,
    /// Tenant party.
    pub tenant: PartyDetails,
    /// Premises.
    pub property: PropertyDetails,
    /// Terms.
    pub terms: AgreementTerms,
    /// Start date as `DD/MM/YYYY`.
    pub start_date_label: String,
    /// End date as `DD/MM/YYYY`.
    pub end_date_label: String,
}

impl From<&Agreement> for AgreementDocumentData {
    fn from(agreement: &Agreement) -> Self {
        Self {
            agreement_number: agreement.agreement_number.clone(),
            language: agreement.language.clone(),
            owner: agreement.owner.clone(),
            tenant: agreement.tenant.clone(),
            property: agreement.property.clone(),
            terms: agreement.terms.clone(),
            start_date_label: agreement.terms.start_date.format("%d/%m/%Y").to_string(),
            end_date_label: agreement.terms.end_date.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Rendering request sent to the document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Template to render.
    pub template_id: DocumentTemplateId,
    /// Output selector.
    pub format: DocumentFormat,
    /// Template data.
    pub data: AgreementDocumentData,
}

/// Rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Output format.
    pub format: DocumentFormat,
    /// Content type reported by the service.
    pub content_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::DocumentFormat;

    #[test]
    fn format_parses_aliases() {
        assert_eq!("Word".parse::<DocumentFormat>().ok(), Some(DocumentFormat::Word));
        assert_eq!("pdf".parse::<DocumentFormat>().ok(), Some(DocumentFormat::Pdf));
        assert!("odt".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn format_serializes_transport_value() {
        let value = serde_json::to_string(&DocumentFormat::Word).unwrap_or_default();
        assert_eq!(value, "\"docx\"");
    }
}
