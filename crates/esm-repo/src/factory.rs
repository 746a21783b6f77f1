//! Construction of repositories from base-location URIs

use std::sync::Arc;

use crate::{
    ArchiveRepository, BaseUri, ConfigurationError, DirectoryRepository, ModuleRepository,
};

/// Builds the concrete repository named by a [`BaseUri`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Build a repository for `uri`.
    ///
    /// `file:` URIs produce a [`DirectoryRepository`], `archive:`/`jar:` URIs
    /// an [`ArchiveRepository`].
    pub fn build(uri: &BaseUri) -> Result<Arc<dyn ModuleRepository>, ConfigurationError> {
        let repository: Arc<dyn ModuleRepository> = match uri {
            BaseUri::Directory(root) => Arc::new(DirectoryRepository::new(root)?),
            BaseUri::Archive { .. } => Arc::new(ArchiveRepository::from_uri(uri)?),
        };
        tracing::debug!(%uri, repository = %repository.identity(), "Built module repository");
        Ok(repository)
    }

    /// Parse `text` as a base URI and build the repository.
    pub fn parse(text: &str) -> Result<Arc<dyn ModuleRepository>, ConfigurationError> {
        Self::build(&BaseUri::parse(text)?)
    }
}
