use std::sync::Arc;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{
    AgreementDocumentData, AgreementId, DocumentFormat, DocumentRequest, DocumentTemplateId,
    RenderedDocument,
};
use tracing::info;

use crate::{AgreementRepository, DocumentRenderer};

/// Renders stored agreements through the document service.
#[derive(Clone)]
pub struct DocumentService {
    agreements: Arc<dyn AgreementRepository>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl DocumentService {
    /// Creates a new document service.
    #[must_use]
    pub fn new(
        agreements: Arc<dyn AgreementRepository>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            agreements,
            renderer,
        }
    }

    /// Fetches an agreement and renders it with the given template.
    pub async fn render_agreement(
        &self,
        agreement_id: AgreementId,
        template_id: DocumentTemplateId,
        format: DocumentFormat,
    ) -> AppResult<RenderedDocument> {
        let agreement = self.agreements.find_agreement(agreement_id).await?;
        let request = DocumentRequest {
            template_id,
            format,
            data: AgreementDocumentData::from(&agreement),
        };

        let rendered = self.renderer.render(request).await?;
        if rendered.bytes.is_empty() {
            return Err(AppError::Internal(format!(
                "document service returned an empty {} document for agreement '{agreement_id}'",
                format.as_str()
            )));
        }

        info!(
            agreement_id = %agreement_id,
            format = format.as_str(),
            bytes = rendered.bytes.len(),
            "agreement document rendered"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leasedesk_core::AppError;
    use leasedesk_domain::{AgreementId, DocumentFormat, DocumentTemplateId};

    use super::DocumentService;
    use crate::test_fixtures::{FakeAgreements, FakeRenderer, stored_agreement};

    fn template() -> DocumentTemplateId {
        DocumentTemplateId::new("rent-11m").unwrap_or_else(|error| panic!("{error}"))
    }

    #[tokio::test]
    async fn renders_stored_agreement_with_template_data() {
        let agreements = Arc::new(FakeAgreements::with_agreement(stored_agreement()));
        let renderer = Arc::new(FakeRenderer::default());
        let service = DocumentService::new(agreements, renderer.clone());

        let rendered = service
            .render_agreement(AgreementId::new(42), template(), DocumentFormat::Pdf)
            .await;

        assert!(rendered.is_ok());
        let requests = renderer.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].format, DocumentFormat::Pdf);
        assert_eq!(requests[0].data.agreement_number, "AGR-2025-0042");
        assert_eq!(requests[0].data.start_date_label, "01/04/2025");
    }

    #[tokio::test]
    async fn missing_agreement_is_not_found() {
        let service = DocumentService::new(
            Arc::new(FakeAgreements::default()),
            Arc::new(FakeRenderer::default()),
        );

        let rendered = service
            .render_agreement(AgreementId::new(7), template(), DocumentFormat::Html)
            .await;

        assert!(matches!(rendered, Err(AppError::NotFound(_))));
    }
}
