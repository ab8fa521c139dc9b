use async_trait::async_trait;
use leasedesk_application::AgreementRepository;
use leasedesk_core::AppResult;
use leasedesk_domain::{Agreement, AgreementId, Customer, MobileNumber, NewAgreement};
use reqwest::Method;

use super::{HttpApiClient, decode};

#[async_trait]
impl AgreementRepository for HttpApiClient {
    async fn find_customer_by_mobile(
        &self,
        mobile: &MobileNumber,
    ) -> AppResult<Option<Customer>> {
        let mut url = self.url("/customers/lookup")?;
        url.query_pairs_mut().append_pair("mobile", mobile.as_str());

        match self.get_json::<Customer>(url, "customer lookup").await {
            Ok(customer) => Ok(Some(customer)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_agreement(&self, agreement: NewAgreement) -> AppResult<Agreement> {
        let context = "agreement create";
        let response = self
            .send(
                self.request(Method::POST, self.url("/agreements")?)
                    .json(&agreement),
                context,
            )
            .await?;
        decode(response, context).await
    }

    async fn find_agreement(&self, agreement_id: AgreementId) -> AppResult<Agreement> {
        self.get_json(
            self.url(&format!("/agreements/{agreement_id}"))?,
            "agreement lookup",
        )
        .await
    }
}
