// warp-coder-cli/src/null_adapters.rs
// ============================================================================
// Module: Unconfigured Adapter Stand-ins
// Description: CoderClient/CodeHostAdapter/IssuesClient/GitClient/NotifyClient
//              implementations that reject every call.
// Purpose: Let `watch` build a complete Scheduler even though no concrete
//          code-host, issue-tracker, git, or coder-subprocess integration
//          ships in this workspace (§4.7 scopes those out as external
//          collaborators; only their contract traits live here). Every
//          method returns the adapter's "unavailable" variant so a
//          misconfigured deployment fails loudly at the first work act
//          instead of silently doing nothing.
// Dependencies: async_trait, warp_coder_adapters
// ============================================================================

use async_trait::async_trait;
use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::CodeHostError;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::CoderError;
use warp_coder_adapters::CoderEnvelope;
use warp_coder_adapters::CoderEvent;
use warp_coder_adapters::GitClient;
use warp_coder_adapters::GitError;
use warp_coder_adapters::GitStatus;
use warp_coder_adapters::IssueComment;
use warp_coder_adapters::IssuesClient;
use warp_coder_adapters::IssuesError;
use warp_coder_adapters::NotifyClient;
use warp_coder_adapters::NotifyError;
use warp_coder_adapters::NotifyMessage;
use warp_coder_adapters::PrCommit;
use warp_coder_adapters::PrFile;
use warp_coder_adapters::PrState;
use warp_coder_adapters::ReviewSubmission;
use warp_coder_adapters::RunOptions;
use warp_coder_core::IssueId;

/// Message carried by every "not configured" error this module returns.
const NOT_CONFIGURED: &str = "no concrete adapter is configured for this deployment";

/// A [`CoderClient`] with no subprocess behind it.
#[derive(Debug, Default)]
pub struct NullCoderClient;

#[async_trait]
impl CoderClient for NullCoderClient {
    async fn run(&self, _prompt: &str, _options: &RunOptions, _on_event: &mut (dyn FnMut(CoderEvent) + Send)) -> Result<CoderEnvelope, CoderError> {
        Err(CoderError::SpawnFailed(NOT_CONFIGURED.to_string()))
    }

    async fn one_shot(&self, _prompt: &str, _options: &RunOptions) -> Result<CoderEnvelope, CoderError> {
        Err(CoderError::SpawnFailed(NOT_CONFIGURED.to_string()))
    }
}

/// A [`CodeHostAdapter`] with no code host behind it.
#[derive(Debug, Default)]
pub struct NullCodeHostAdapter;

#[async_trait]
impl CodeHostAdapter for NullCodeHostAdapter {
    async fn find_open_pr(&self, _repo: &str, _issue_number: u64) -> Result<Option<u64>, CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn submit_review(&self, _repo: &str, _pr_number: u64, _submission: &ReviewSubmission) -> Result<(), CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn merge_pr(&self, _repo: &str, _pr_number: u64) -> Result<(), CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn get_pr_state(&self, _repo: &str, _pr_number: u64) -> Result<PrState, CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn get_pr_files(&self, _repo: &str, _pr_number: u64) -> Result<Vec<PrFile>, CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn get_pr_commits(&self, _repo: &str, _pr_number: u64) -> Result<Vec<PrCommit>, CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn get_pr_branch(&self, _repo: &str, _pr_number: u64) -> Result<String, CodeHostError> {
        Err(CodeHostError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    fn clear_cache(&self) {}
}

/// An [`IssuesClient`] with no issue tracker behind it.
#[derive(Debug, Default)]
pub struct NullIssuesClient;

#[async_trait]
impl IssuesClient for NullIssuesClient {
    async fn get_issue_body(&self, _repo: &str, _issue_number: u64) -> Result<String, IssuesError> {
        Err(IssuesError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn get_issue_comments(&self, _repo: &str, _issue_number: u64) -> Result<Vec<IssueComment>, IssuesError> {
        Err(IssuesError::Unavailable(NOT_CONFIGURED.to_string()))
    }
}

/// A [`GitClient`] with no working tree behind it.
#[derive(Debug, Default)]
pub struct NullGitClient;

#[async_trait]
impl GitClient for NullGitClient {
    async fn clone_repo(&self, _url: &str, _branch: Option<&str>) -> Result<(), GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn create_branch(&self, _name: &str) -> Result<(), GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn switch_branch(&self, _name: &str) -> Result<(), GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn current_branch(&self) -> Result<String, GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn status(&self) -> Result<GitStatus, GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn add_all_commit_all(&self, _message: &str) -> Result<(), GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }

    async fn push_force_with_lease(&self, _remote: &str, _branch: &str) -> Result<(), GitError> {
        Err(GitError::Failed(NOT_CONFIGURED.to_string()))
    }
}

/// A [`NotifyClient`] with no notification target behind it.
#[derive(Debug, Default)]
pub struct NullNotifyClient;

#[async_trait]
impl NotifyClient for NullNotifyClient {
    async fn comment(&self, _issue_id: &IssueId, _message: &NotifyMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable(NOT_CONFIGURED.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use warp_coder_adapters::CodeHostAdapter;
    use warp_coder_adapters::CoderClient;
    use warp_coder_adapters::GitClient;
    use warp_coder_adapters::IssuesClient;
    use warp_coder_adapters::NotifyClient;
    use warp_coder_adapters::NotifyMessage;
    use warp_coder_adapters::RunOptions;
    use warp_coder_core::IssueId;

    use super::NullCodeHostAdapter;
    use super::NullCoderClient;
    use super::NullGitClient;
    use super::NullIssuesClient;
    use super::NullNotifyClient;

    #[tokio::test]
    async fn every_null_adapter_reports_unavailable() {
        let options = RunOptions {
            max_turns: None,
            allowed_tools: None,
            disallowed_tools: Vec::new(),
            working_dir: ".".to_string(),
        };
        assert!(NullCoderClient.one_shot("hello", &options).await.is_err());
        assert!(NullCodeHostAdapter.find_open_pr("acme/widgets", 1).await.is_err());
        assert!(NullIssuesClient.get_issue_body("acme/widgets", 1).await.is_err());
        assert!(NullGitClient.current_branch().await.is_err());
        let message = NotifyMessage {
            repo: "acme/widgets".to_string(),
            run_id: None,
            title: None,
            body: "hi".to_string(),
        };
        assert!(NullNotifyClient.comment(&IssueId::new("issue-1"), &message).await.is_err());
    }
}
