//! Leasedesk operator CLI composition root.

#![forbid(unsafe_code)]

mod admin_command;
mod admin_config;

use std::env;
use std::io::BufRead;
use std::sync::Arc;

use leasedesk_application::{
    DirectoryQueryService, DocumentService, EditorState, NotificationSink,
    PermissionEditorService, PermissionSyncListener, SaveReport,
};
use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{PermissionCatalog, User, UserId};
use leasedesk_infrastructure::{
    HttpApiClient, HttpDocumentRenderer, InMemoryDirectoryCache, TracingNotificationSink,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::admin_command::{AdminCommand, PermissionToggle};
use crate::admin_config::AdminConfig;

const REALTIME_CHANNEL_CAPACITY: usize = 64;

struct AdminServices {
    queries: DirectoryQueryService,
    editor: PermissionEditorService,
    documents: DocumentService,
    listener: PermissionSyncListener,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = AdminCommand::parse(&args)?;
    let config = AdminConfig::load()?;
    let services = build_services(&config)?;

    info!(
        api_base_url = %config.api_base_url,
        cache_ttl_seconds = config.cache_ttl_seconds,
        "leasedesk admin starting"
    );

    match command {
        AdminCommand::Users => list_users(&services).await,
        AdminCommand::ShowUser(user_id) => {
            let catalog = services.queries.catalog().await?;
            let user = services.queries.user(&user_id).await?;
            print_user(&user, &catalog);
            Ok(())
        }
        AdminCommand::EditUser { user_id, changes } => {
            edit_user(&services, &user_id, &changes).await
        }
        AdminCommand::Render {
            agreement_id,
            template_id,
            format,
            out_path,
        } => {
            let document = services
                .documents
                .render_agreement(agreement_id, template_id, format)
                .await?;
            std::fs::write(&out_path, &document.bytes).map_err(|error| {
                AppError::Internal(format!(
                    "failed to write document to '{}': {error}",
                    out_path.display()
                ))
            })?;
            println!(
                "wrote {} bytes ({}) to {}",
                document.bytes.len(),
                document.content_type,
                out_path.display()
            );
            Ok(())
        }
        AdminCommand::Watch => {
            watch_stdin(&services.listener).await;
            Ok(())
        }
    }
}

fn build_services(config: &AdminConfig) -> AppResult<AdminServices> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }
    let http_client = builder
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let api = Arc::new(HttpApiClient::new(
        http_client.clone(),
        config.api_base_url.as_str(),
        config.api_token.clone(),
    ));
    let renderer = Arc::new(HttpDocumentRenderer::new(
        http_client,
        config.render_base_url.as_str(),
        config.api_token.clone(),
    ));
    let notifications: Arc<dyn NotificationSink> = Arc::new(TracingNotificationSink::new());

    let queries = DirectoryQueryService::new(
        api.clone(),
        Arc::new(InMemoryDirectoryCache::new()),
        config.cache_ttl_seconds,
    );

    Ok(AdminServices {
        editor: PermissionEditorService::new(
            api.clone(),
            queries.clone(),
            notifications,
            config.close_delay,
        ),
        documents: DocumentService::new(api, renderer),
        listener: PermissionSyncListener::new(queries.clone()),
        queries,
    })
}

async fn list_users(services: &AdminServices) -> AppResult<()> {
    let users = services.queries.users().await?;
    for user in &users {
        println!(
            "{:<12} {:<24} roles={} effective={}",
            user.id(),
            user.name(),
            user.roles().len(),
            user.effective_permissions().len()
        );
    }
    info!(count = users.len(), "listed users");
    Ok(())
}

fn print_user(user: &User, catalog: &PermissionCatalog) {
    println!("{} ({})", user.name(), user.id());
    for permission_id in user.effective_permissions() {
        let source = if user.inherits(permission_id) {
            "role"
        } else {
            "override"
        };
        match catalog.get(permission_id) {
            Some(permission) => println!("  {} [{source}]", permission.code()),
            None => println!("  #{permission_id} [{source}]"),
        }
    }
}

async fn edit_user(
    services: &AdminServices,
    user_id: &UserId,
    changes: &[PermissionToggle],
) -> AppResult<()> {
    let catalog = services.queries.catalog().await?;
    let mut editor = services.editor.open(user_id).await?;

    for change in changes {
        let permission_id = catalog.resolve_code(change.code.as_str())?;
        editor.set(permission_id, change.granted)?;
    }

    if editor.pending_changes().is_empty() {
        println!("no changes to save for {user_id}");
        editor.close();
        return Ok(());
    }

    let report = services.editor.save(&mut editor).await?;
    print_report(&report, &catalog);

    if editor.state() != EditorState::Clean {
        println!(
            "{} change(s) for {user_id} are not confirmed by the directory",
            editor.pending_changes().len()
        );
        return Ok(());
    }

    print_user(editor.target(), &catalog);
    if let Some(delay) = report.close_after {
        tokio::time::sleep(delay).await;
        editor.close();
    }
    Ok(())
}

fn print_report(report: &SaveReport, catalog: &PermissionCatalog) {
    let code = |permission_id| {
        catalog
            .get(permission_id)
            .map(|permission| permission.code().to_string())
            .unwrap_or_else(|| format!("#{permission_id}"))
    };

    println!(
        "{}: {} applied, {} failed",
        report.outcome.as_str(),
        report.applied.len(),
        report.failed.len()
    );
    for request in &report.applied {
        println!("  ok     {}", code(request.permission_id()));
    }
    for failure in &report.failed {
        println!(
            "  failed {}: {}",
            code(failure.request.permission_id()),
            failure.error
        );
    }
}

async fn watch_stdin(listener: &PermissionSyncListener) {
    let (sender, receiver) = mpsc::channel(REALTIME_CHANNEL_CAPACITY);

    let reader = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(error) => {
                    warn!(error = %error, "stopped reading realtime frames from stdin");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let applied = listener.run(receiver).await;
    if let Err(error) = reader.await {
        warn!(error = %error, "stdin reader task failed");
    }
    println!("applied {applied} permission update(s)");
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
