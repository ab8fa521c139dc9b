use std::path::PathBuf;
use std::str::FromStr;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{AgreementId, DocumentFormat, DocumentTemplateId, UserId};

pub const USAGE: &str = "usage: leasedesk-admin <command>
  users
  show-user <user-id>
  edit-user <user-id> <+code|-code>...
  render <agreement-id> <template-id> <html|pdf|docx> <out-path>
  watch";

/// Desired state for one permission in an `edit-user` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionToggle {
    pub code: String,
    pub granted: bool,
}

impl FromStr for PermissionToggle {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (granted, code) = match value.split_at_checked(1) {
            Some(("+", code)) => (true, code),
            Some(("-", code)) => (false, code),
            _ => {
                return Err(AppError::Validation(format!(
                    "permission change '{value}' must start with '+' or '-'"
                )));
            }
        };
        if code.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "permission change '{value}' is missing a code"
            )));
        }

        Ok(Self {
            code: code.trim().to_owned(),
            granted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Users,
    ShowUser(UserId),
    EditUser {
        user_id: UserId,
        changes: Vec<PermissionToggle>,
    },
    Render {
        agreement_id: AgreementId,
        template_id: DocumentTemplateId,
        format: DocumentFormat,
        out_path: PathBuf,
    },
    Watch,
}

impl AdminCommand {
    /// Parses the arguments that follow the program name.
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let Some((command, rest)) = args.split_first() else {
            return Err(usage_error("missing command"));
        };

        match (command.as_str(), rest) {
            ("users", []) => Ok(Self::Users),
            ("show-user", [user_id]) => Ok(Self::ShowUser(UserId::new(user_id.as_str())?)),
            ("edit-user", [user_id, changes @ ..]) if !changes.is_empty() => Ok(Self::EditUser {
                user_id: UserId::new(user_id.as_str())?,
                changes: changes
                    .iter()
                    .map(|change| change.parse())
                    .collect::<AppResult<Vec<_>>>()?,
            }),
            ("render", [agreement_id, template_id, format, out_path]) => {
                let agreement_id = agreement_id.parse::<i64>().map_err(|error| {
                    AppError::Validation(format!("invalid agreement id '{agreement_id}': {error}"))
                })?;
                Ok(Self::Render {
                    agreement_id: AgreementId::new(agreement_id),
                    template_id: DocumentTemplateId::new(template_id.as_str())?,
                    format: format.parse()?,
                    out_path: PathBuf::from(out_path),
                })
            }
            ("watch", []) => Ok(Self::Watch),
            (other, _) => Err(usage_error(&format!("unexpected arguments for '{other}'"))),
        }
    }
}

fn usage_error(reason: &str) -> AppError {
    AppError::Validation(format!("{reason}\n{USAGE}"))
}
