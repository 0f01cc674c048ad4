//! Reference and version resolution against a mirror or its remote.
//!
//! These operations are read-only and are not de-duplicated. The only
//! mutation they can trigger is the single `update` in [`RepositoryManager::resolve`]
//! when escalation is requested, and that goes through the update registry.

use log::debug;

use crate::error::{Error, Result};
use crate::references::{parse_commit_id, parse_references, ReferenceEntry, ReferenceSet};
use crate::repository::{RepositoryHandle, RepositoryManager};
use crate::version::{max_satisfying, parse_range, sort_versions, VersionMode};

impl RepositoryManager {
    /// Resolve `reference` (branch, tag or abbreviated commit id) to a full
    /// commit id.
    ///
    /// With `prefer_remote`, a local miss triggers one update of the mirror
    /// followed by exactly one more local attempt. The second miss is final.
    pub async fn resolve(
        &self,
        handle: &RepositoryHandle,
        reference: &str,
        prefer_remote: bool,
    ) -> Result<String> {
        handle.require_installed("resolve")?;

        match self.resolve_local(handle, reference).await {
            Ok(commit_id) => return Ok(commit_id),
            Err(error) if !prefer_remote => return Err(error),
            Err(_) => {}
        }

        debug!(
            "{} not in {}, updating before retry",
            reference,
            handle.mirror_path().display()
        );
        self.update(handle).await?;
        self.resolve_local(handle, reference).await
    }

    /// Resolve `reference` against the mirror as it is, without fetching.
    pub async fn resolve_local(&self, handle: &RepositoryHandle, reference: &str) -> Result<String> {
        handle.require_installed("resolve")?;

        let not_found = |message: String| Error::ReferenceNotFound {
            reference: reference.to_string(),
            message,
        };
        let output = self
            .git_ops
            .rev_parse(handle.local_context(), reference)
            .await
            .map_err(|error| not_found(error.detail().trim().to_string()))?;

        parse_commit_id(&output).ok_or_else(|| not_found(String::new()))
    }

    /// List branches and tags, optionally restricted to those matching
    /// `filter`.
    ///
    /// With `remote` the listing comes straight from the remote URL and no
    /// mirror is needed. Otherwise the mirror must be installed.
    pub async fn list_references(
        &self,
        handle: &RepositoryHandle,
        filter: Option<&str>,
        remote: bool,
    ) -> Result<ReferenceSet> {
        let listing = if remote {
            self.git_ops
                .ls_remote(handle.remote_context(), handle.url(), filter)
                .await?
        } else {
            handle.require_installed("list references")?;
            self.git_ops
                .show_ref(handle.local_context(), filter)
                .await?
        };
        Ok(parse_references(&listing))
    }

    pub async fn heads(&self, handle: &RepositoryHandle, remote: bool) -> Result<Vec<ReferenceEntry>> {
        Ok(self.list_references(handle, None, remote).await?.heads)
    }

    /// Alias of [`RepositoryManager::heads`].
    pub async fn branches(
        &self,
        handle: &RepositoryHandle,
        remote: bool,
    ) -> Result<Vec<ReferenceEntry>> {
        self.heads(handle, remote).await
    }

    pub async fn tags(&self, handle: &RepositoryHandle, remote: bool) -> Result<Vec<ReferenceEntry>> {
        Ok(self.list_references(handle, None, remote).await?.tags)
    }

    /// Tags whose names are versions under `mode`, newest first.
    pub async fn versions(
        &self,
        handle: &RepositoryHandle,
        remote: bool,
        mode: VersionMode,
    ) -> Result<Vec<ReferenceEntry>> {
        let tags = self.tags(handle, remote).await?;
        Ok(sort_versions(tags, mode)
            .into_iter()
            .map(|tag| tag.entry)
            .collect())
    }

    /// The tag with the highest strict version matching `range`, if any.
    ///
    /// An unparsable range fails before anything is listed.
    pub async fn max_satisfying(
        &self,
        handle: &RepositoryHandle,
        range: &str,
        remote: bool,
    ) -> Result<Option<ReferenceEntry>> {
        let range = parse_range(range)?;
        let tags = self.tags(handle, remote).await?;
        Ok(max_satisfying(
            &sort_versions(tags, VersionMode::Strict),
            &range,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_ops::{
        MockFileSystemOperations, MockGitOperations, SHA_0_1_3, SHA_1_0_0, SHA_MASTER,
    };
    use crate::remote::RemoteDescriptor;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn listing() -> String {
        format!(
            "{master} HEAD\n\
             {master} refs/heads/master\n\
             {v1} refs/tags/1.0.0\n\
             {v013} refs/tags/0.1.3\n\
             {v013} refs/tags/0.1.3^{{}}\n\
             {master} refs/tags/not-a-version\n\
             {master} refs/remotes/origin/master\n",
            master = SHA_MASTER,
            v1 = SHA_1_0_0,
            v013 = SHA_0_1_3,
        )
    }

    async fn setup(git: MockGitOperations) -> (Arc<MockGitOperations>, RepositoryManager, RepositoryHandle) {
        let git = Arc::new(git);
        let manager = RepositoryManager::with_operations(
            PathBuf::from("/mock/cache"),
            git.clone(),
            Arc::new(MockFileSystemOperations::new()),
        )
        .await
        .unwrap();
        let remote = Arc::new(RemoteDescriptor::new("github", "github.com", None).unwrap());
        let handle = manager
            .handle(remote, "jonathanong", "routington")
            .await
            .unwrap();
        (git, manager, handle)
    }

    async fn installed(git: MockGitOperations) -> (Arc<MockGitOperations>, RepositoryManager, RepositoryHandle) {
        let (git, manager, handle) = setup(git).await;
        manager.install(&handle).await.unwrap();
        (git, manager, handle)
    }

    #[tokio::test]
    async fn test_resolve_short_commit_id() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_commit("08c7518caf83", SHA_1_0_0)).await;
        let commit_id = manager
            .resolve(&handle, "08c7518caf83", false)
            .await
            .unwrap();
        assert_eq!(commit_id, SHA_1_0_0);
    }

    #[tokio::test]
    async fn test_resolve_local_miss_without_escalation() {
        let (git, manager, handle) = installed(MockGitOperations::new()).await;
        let error = manager
            .resolve(&handle, "abcabcabcabc", false)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::ReferenceNotFound { ref reference, .. } if reference == "abcabcabcabc"));
        assert_eq!(git.count("fetch"), 0);
    }

    #[tokio::test]
    async fn test_resolve_escalates_exactly_once() {
        let (git, manager, handle) = installed(MockGitOperations::new()).await;
        let error = manager
            .resolve(&handle, "abcabcabcabc", true)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::ReferenceNotFound { .. }));
        assert_eq!(git.count("fetch"), 1);
        assert_eq!(git.count("rev-parse"), 2);
    }

    #[tokio::test]
    async fn test_resolve_finds_reference_after_update() {
        let (git, manager, handle) = installed(
            MockGitOperations::new()
                .with_fetch_output("Fetching origin\n * [new branch] feature -> feature\n")
                .with_commit_after_fetch("feature", SHA_MASTER),
        )
        .await;
        let commit_id = manager.resolve(&handle, "feature", true).await.unwrap();
        assert_eq!(commit_id, SHA_MASTER);
        assert_eq!(git.count("fetch"), 1);
    }

    #[tokio::test]
    async fn test_resolve_local_hit_skips_update() {
        let (git, manager, handle) =
            installed(MockGitOperations::new().with_commit("master", SHA_MASTER)).await;
        assert_eq!(
            manager.resolve(&handle, "master", true).await.unwrap(),
            SHA_MASTER
        );
        assert_eq!(git.count("fetch"), 0);
    }

    #[tokio::test]
    async fn test_resolve_update_failure_propagates() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_fetch_error("fatal: unable to access")).await;
        let error = manager.resolve(&handle, "nope", true).await.unwrap_err();
        assert!(matches!(error, Error::UpdateFailed { .. }));
    }

    #[tokio::test]
    async fn test_resolve_requires_install() {
        let (git, manager, handle) = setup(MockGitOperations::new()).await;
        let error = manager.resolve(&handle, "master", false).await.unwrap_err();
        assert!(matches!(error, Error::PreconditionViolation { .. }));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_references_local() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_local_refs(&listing())).await;
        let references = manager.list_references(&handle, None, false).await.unwrap();

        assert_eq!(
            references.heads,
            vec![ReferenceEntry::new("master", SHA_MASTER)]
        );
        let tag_names: Vec<&str> = references.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["1.0.0", "0.1.3", "not-a-version"]);
    }

    #[tokio::test]
    async fn test_list_references_filtered() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_local_refs(&listing())).await;
        let references = manager
            .list_references(&handle, Some("1.0.0"), false)
            .await
            .unwrap();
        assert!(references.heads.is_empty());
        assert_eq!(references.tags, vec![ReferenceEntry::new("1.0.0", SHA_1_0_0)]);

        let none = manager
            .list_references(&handle, Some("missing"), false)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_references_remote_without_install() {
        let (git, manager, handle) =
            setup(MockGitOperations::new().with_remote_refs(&listing())).await;
        let heads = manager.heads(&handle, true).await.unwrap();
        assert_eq!(heads, vec![ReferenceEntry::new("master", SHA_MASTER)]);
        assert_eq!(git.count("ls-remote"), 1);
        assert_eq!(git.count("clone"), 0);
    }

    #[tokio::test]
    async fn test_list_references_local_requires_install() {
        let (_, manager, handle) = setup(MockGitOperations::new()).await;
        let error = manager.tags(&handle, false).await.unwrap_err();
        assert!(matches!(error, Error::PreconditionViolation { .. }));
    }

    #[tokio::test]
    async fn test_branches_matches_heads() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_local_refs(&listing())).await;
        assert_eq!(
            manager.branches(&handle, false).await.unwrap(),
            manager.heads(&handle, false).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_versions_newest_first() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_local_refs(&listing())).await;
        let versions = manager
            .versions(&handle, false, VersionMode::Strict)
            .await
            .unwrap();
        assert_eq!(
            versions,
            vec![
                ReferenceEntry::new("1.0.0", SHA_1_0_0),
                ReferenceEntry::new("0.1.3", SHA_0_1_3),
            ]
        );

        // unchanged mirror, same answer
        let again = manager
            .versions(&handle, false, VersionMode::Strict)
            .await
            .unwrap();
        assert_eq!(versions, again);
    }

    #[tokio::test]
    async fn test_max_satisfying() {
        let (_, manager, handle) =
            installed(MockGitOperations::new().with_local_refs(&listing())).await;

        let found = manager
            .max_satisfying(&handle, "~0.1.3", false)
            .await
            .unwrap();
        assert_eq!(found, Some(ReferenceEntry::new("0.1.3", SHA_0_1_3)));

        let newest = manager.max_satisfying(&handle, "*", false).await.unwrap();
        assert_eq!(newest.map(|e| e.name), Some("1.0.0".to_string()));

        let absent = manager.max_satisfying(&handle, "^2", false).await.unwrap();
        assert_eq!(absent, None);
    }

    #[tokio::test]
    async fn test_max_satisfying_invalid_range() {
        let (git, manager, handle) = installed(MockGitOperations::new()).await;
        let error = manager
            .max_satisfying(&handle, "not a range", false)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::InvalidRange { .. }));
        assert_eq!(git.count("show-ref"), 0);
    }
}
