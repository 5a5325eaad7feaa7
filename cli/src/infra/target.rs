//! Opens execution sessions on a resolved `Target`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::SessionOpener;
use crate::domain::prompt::PromptMatcher;
use crate::domain::target::{HostKeyChecking, Target};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::session::{LocalSession, RemoteSession, Session};
use crate::infra::ssh::{SshConnection, SshSettings};

/// `SessionOpener` for the CLI: a local shell or an SSH connection.
pub struct TargetConnector {
    target: Target,
    command_timeout: Option<Duration>,
    host_key_checking: HostKeyChecking,
    prompt: Arc<dyn PromptMatcher>,
}

impl TargetConnector {
    pub fn new(
        target: Target,
        command_timeout: Option<Duration>,
        host_key_checking: HostKeyChecking,
        prompt: Arc<dyn PromptMatcher>,
    ) -> Self {
        Self {
            target,
            command_timeout,
            host_key_checking,
            prompt,
        }
    }
}

impl SessionOpener for TargetConnector {
    type Session = Session;

    async fn open(&self) -> Result<Session> {
        match &self.target {
            Target::Local => Ok(Session::Local(LocalSession::new(
                TokioCommandRunner::new(),
                self.command_timeout,
            ))),
            Target::Remote(remote) => {
                let settings = SshSettings {
                    host_key_checking: self.host_key_checking,
                    command_timeout: self.command_timeout,
                    prompt: Arc::clone(&self.prompt),
                };
                let connection = SshConnection::connect(remote, settings).await?;
                Ok(Session::Remote(RemoteSession::new(connection)))
            }
        }
    }

    fn describe(&self) -> String {
        self.target.to_string()
    }
}
