use async_trait::async_trait;
use leasedesk_core::AppResult;
use leasedesk_domain::{
    Agreement, AgreementId, Customer, DocumentRequest, MobileNumber, NewAgreement,
    RenderedDocument,
};

/// Port for agreement and customer records.
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Looks up a customer by mobile number. Absence is `Ok(None)`.
    async fn find_customer_by_mobile(&self, mobile: &MobileNumber)
    -> AppResult<Option<Customer>>;

    /// Creates an agreement.
    async fn create_agreement(&self, agreement: NewAgreement) -> AppResult<Agreement>;

    /// Finds one agreement, failing with `NotFound` when absent.
    async fn find_agreement(&self, agreement_id: AgreementId) -> AppResult<Agreement>;
}

/// Port for the external document rendering service.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders one document.
    async fn render(&self, request: DocumentRequest) -> AppResult<RenderedDocument>;
}
