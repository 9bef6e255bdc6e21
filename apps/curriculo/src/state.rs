use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::auth::LinkedInClient;
use crate::catalog::ModelCatalog;
use crate::config::Config;
use crate::forge::{GitHubForge, RepositoryForge};
use crate::render::{renderer_from_config, PdfOptions, PdfRenderer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: ModelCatalog,
    /// Pluggable HTML→PDF backend, selected by `PDF_BACKEND`.
    pub pdf: Arc<dyn PdfRenderer>,
    pub pdf_options: PdfOptions,
    /// `None` when `GITHUB_TOKEN` is unset; contribution then answers 503.
    pub forge: Option<Arc<dyn RepositoryForge>>,
    /// `None` without LinkedIn credentials; sign-in then answers 503.
    pub linkedin: Option<LinkedInClient>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let pdf = renderer_from_config(&config)?;

        let forge = config.github.as_ref().map(|gh| {
            info!("GitHub forge enabled for {}/{}", gh.owner, gh.repo);
            Arc::new(GitHubForge::new(gh.token.clone(), &gh.owner, &gh.repo))
                as Arc<dyn RepositoryForge>
        });
        if forge.is_none() {
            info!("GITHUB_TOKEN not set; model contribution disabled");
        }

        let linkedin = config.linkedin.as_ref().map(|li| {
            LinkedInClient::new(
                li.client_id.clone(),
                li.client_secret.clone(),
                li.redirect_uri.clone(),
            )
        });
        if linkedin.is_none() {
            info!("LinkedIn credentials not set; sign-in disabled");
        }

        Ok(AppState {
            catalog: ModelCatalog::new(&config.models_dir),
            pdf,
            pdf_options: PdfOptions::default(),
            forge,
            linkedin,
            config,
        })
    }
}
