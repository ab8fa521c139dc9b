use std::sync::Arc;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{
    Agreement, AgreementWizard, Customer, FieldError, MobileNumber, PartyRole, WizardStep,
};
use tracing::{info, warn};

use crate::{AgreementRepository, Notification, NotificationSink};

/// Drives the agreement wizard against the agreement repository.
#[derive(Clone)]
pub struct AgreementWizardService {
    repository: Arc<dyn AgreementRepository>,
    notifications: Arc<dyn NotificationSink>,
}

impl AgreementWizardService {
    /// Creates a new wizard service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AgreementRepository>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Looks up a customer by mobile and copies their details into a party slot.
    ///
    /// An unknown number is a normal negative result: the draft is left as
    /// is and no notification is sent.
    pub async fn autofill_party(
        &self,
        wizard: &mut AgreementWizard,
        role: PartyRole,
        mobile: &str,
    ) -> AppResult<Option<Customer>> {
        let mobile = MobileNumber::new(mobile)?;
        let Some(customer) = self.repository.find_customer_by_mobile(&mobile).await? else {
            info!(mobile = %mobile, "no customer found for mobile lookup");
            return Ok(None);
        };

        wizard.draft_mut().apply_customer(role, &customer);
        info!(customer_id = %customer.id, ?role, "autofilled party from customer record");
        Ok(Some(customer))
    }

    /// Creates the agreement once the wizard reached review with a valid draft.
    pub async fn submit(&self, wizard: &AgreementWizard) -> AppResult<Agreement> {
        if wizard.step() != WizardStep::Review {
            return Err(AppError::Validation(
                "agreement can only be submitted from the review step".to_owned(),
            ));
        }

        let agreement = wizard
            .draft()
            .to_new_agreement()
            .map_err(|errors| AppError::Validation(describe_errors(&errors)))?;

        match self.repository.create_agreement(agreement).await {
            Ok(created) => {
                info!(
                    agreement_id = %created.id,
                    agreement_number = created.agreement_number.as_str(),
                    "agreement created"
                );
                self.notifications
                    .notify(Notification::success(
                        "Agreement created",
                        format!("Agreement {} was created.", created.agreement_number),
                    ))
                    .await;
                Ok(created)
            }
            Err(error) => {
                warn!(error = %error, "agreement creation failed");
                self.notifications
                    .notify(Notification::error(
                        "Failed to create agreement",
                        error.to_string(),
                    ))
                    .await;
                Err(error)
            }
        }
    }
}

fn describe_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
