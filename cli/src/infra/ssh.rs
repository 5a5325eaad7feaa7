//! SSH transport for remote targets, built on `russh`.
//!
//! `SshConnection` owns one authenticated connection and runs each command
//! on a fresh session channel. Remote stdout and stderr are streamed to the
//! local terminal as they arrive. When the output looks like a sudo password
//! prompt, one line is read from the local terminal and sent back on the
//! same channel.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use russh::client::{self, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use russh_keys::key;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::domain::error::TargetError;
use crate::domain::prompt::PromptMatcher;
use crate::domain::target::{HostKeyChecking, RemoteTarget, SshAuth};

/// Remote command execution with streamed output.
///
/// Implemented by `SshConnection`; tests substitute scripted fakes.
#[allow(async_fn_in_trait)]
pub trait RemoteExec {
    /// Run `command` on the remote host.
    ///
    /// Returns the exit status the server reported, or `None` if the channel
    /// closed without one (killed by a signal, timed out).
    async fn exec(&self, command: &str) -> Result<Option<u32>>;

    /// Tear down the connection.
    async fn disconnect(&self) -> Result<()>;
}

/// Settings that shape a connection beyond the target itself.
pub struct SshSettings {
    pub host_key_checking: HostKeyChecking,
    pub command_timeout: Option<Duration>,
    pub prompt: Arc<dyn PromptMatcher>,
}

struct ClientHandler {
    host: String,
    port: u16,
    checking: HostKeyChecking,
}

/// What to do with the key a server presents.
#[derive(Debug, PartialEq, Eq)]
enum HostKeyVerdict {
    Accept,
    /// Unknown host under `accept-new`: accept and record the key.
    Learn,
    Reject(String),
}

/// Apply `checking` to the result of a known_hosts `lookup`, which reports
/// whether the presented key is already recorded for the host. A changed key
/// is a lookup error. The lookup is skipped when checking is off.
fn host_key_verdict(
    checking: HostKeyChecking,
    lookup: impl FnOnce() -> Result<bool, String>,
) -> HostKeyVerdict {
    if checking == HostKeyChecking::Off {
        return HostKeyVerdict::Accept;
    }
    match lookup() {
        Ok(true) => HostKeyVerdict::Accept,
        Ok(false) if checking == HostKeyChecking::AcceptNew => HostKeyVerdict::Learn,
        Ok(false) => HostKeyVerdict::Reject("host is not in known_hosts".to_string()),
        Err(reason) => HostKeyVerdict::Reject(reason),
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = anyhow::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        if self.checking == HostKeyChecking::Off {
            tracing::warn!(host = %self.host, "host key checking is off, accepting any key");
        }
        let verdict = host_key_verdict(self.checking, || {
            russh_keys::check_known_hosts(&self.host, self.port, server_public_key)
                .map_err(|e| e.to_string())
        });

        match verdict {
            HostKeyVerdict::Accept => Ok(true),
            HostKeyVerdict::Learn => {
                tracing::warn!(
                    host = %self.host,
                    fingerprint = %server_public_key.fingerprint(),
                    "learning new host key"
                );
                if let Err(e) =
                    russh_keys::learn_known_hosts(&self.host, self.port, server_public_key)
                {
                    tracing::warn!(error = %e, "could not record host key in known_hosts");
                }
                Ok(true)
            }
            HostKeyVerdict::Reject(reason) => Err(TargetError::HostKeyRejected {
                host: self.host.clone(),
                port: self.port,
                reason,
            }
            .into()),
        }
    }
}

/// The message stream of one command channel, and its input side.
#[allow(async_fn_in_trait)]
pub trait CommandChannel {
    /// Next message from the server; `None` once the channel is closed.
    async fn next_message(&mut self) -> Option<ChannelMsg>;

    /// Send `data` to the remote command's stdin.
    async fn send(&mut self, data: &[u8]) -> Result<()>;
}

impl CommandChannel for Channel<Msg> {
    async fn next_message(&mut self) -> Option<ChannelMsg> {
        self.wait().await
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.data(data)
            .await
            .context("sending password to remote command")
    }
}

/// Where the answer to a password prompt comes from.
#[allow(async_fn_in_trait)]
pub trait SecretInput {
    /// One line, without its terminator.
    async fn read_line(&mut self) -> Result<String>;
}

/// Reads from the local terminal without echo, or from piped stdin.
pub struct TerminalSecret;

impl SecretInput for TerminalSecret {
    async fn read_line(&mut self) -> Result<String> {
        read_secret_line().await
    }
}

/// Copies a channel's output to local sinks and answers password prompts.
pub struct OutputRelay<'p, O, E, S> {
    stdout: O,
    stderr: E,
    prompt: &'p dyn PromptMatcher,
    secrets: S,
}

impl<'p, O, E, S> OutputRelay<'p, O, E, S>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
    S: SecretInput,
{
    pub fn new(stdout: O, stderr: E, prompt: &'p dyn PromptMatcher, secrets: S) -> Self {
        Self {
            stdout,
            stderr,
            prompt,
            secrets,
        }
    }

    /// Drain `channel` until it closes.
    ///
    /// Returns the exit status the server reported, or `None` if there was
    /// none.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink or the secret input fails, or the answer
    /// cannot be sent.
    pub async fn run<C: CommandChannel>(&mut self, channel: &mut C) -> Result<Option<u32>> {
        let mut exit_status = None;
        while let Some(msg) = channel.next_message().await {
            match msg {
                ChannelMsg::Data { data } => {
                    forward(&mut self.stdout, &data).await?;
                    self.answer_prompt(&mut *channel, &data).await?;
                }
                ChannelMsg::ExtendedData { data, .. } => {
                    forward(&mut self.stderr, &data).await?;
                    self.answer_prompt(&mut *channel, &data).await?;
                }
                ChannelMsg::ExitStatus {
                    exit_status: status,
                } => exit_status = Some(status),
                _ => {}
            }
        }
        Ok(exit_status)
    }

    async fn answer_prompt<C: CommandChannel>(
        &mut self,
        channel: &mut C,
        chunk: &[u8],
    ) -> Result<()> {
        if !self.prompt.is_password_prompt(&String::from_utf8_lossy(chunk)) {
            return Ok(());
        }
        tracing::debug!("relaying password prompt");
        let mut line = self.secrets.read_line().await?;
        line.push('\n');
        channel.send(line.as_bytes()).await
    }
}

async fn forward<W: AsyncWrite + Unpin>(sink: &mut W, chunk: &[u8]) -> Result<()> {
    sink.write_all(chunk).await?;
    sink.flush().await?;
    Ok(())
}

/// An authenticated SSH connection to one remote target.
pub struct SshConnection {
    handle: client::Handle<ClientHandler>,
    command_timeout: Option<Duration>,
    prompt: Arc<dyn PromptMatcher>,
}

impl SshConnection {
    /// Connect to `target` and authenticate.
    ///
    /// # Errors
    ///
    /// Returns `TargetError` for unreachable hosts, rejected host keys,
    /// unreadable private keys, and rejected credentials.
    pub async fn connect(target: &RemoteTarget, settings: SshSettings) -> Result<Self> {
        let connect_failed = |reason: String| TargetError::Connect {
            host: target.host.clone(),
            port: target.port,
            reason,
        };

        let config = Arc::new(client::Config::default());
        let handler = ClientHandler {
            host: target.host.clone(),
            port: target.port,
            checking: settings.host_key_checking,
        };

        tracing::debug!(host = %target.host, port = target.port, "connecting");
        let mut handle = client::connect(config, (target.host.as_str(), target.port), handler)
            .await
            .map_err(|e| {
                if e.downcast_ref::<TargetError>().is_some() {
                    e
                } else {
                    connect_failed(format!("{e:#}")).into()
                }
            })?;

        let authenticated = match &target.auth {
            SshAuth::Key { path, passphrase } => {
                let key_pair = russh_keys::load_secret_key(path, passphrase.as_deref())
                    .map_err(|e| TargetError::KeyLoad {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                handle
                    .authenticate_publickey(target.user.as_str(), Arc::new(key_pair))
                    .await
            }
            SshAuth::Password(password) => {
                handle
                    .authenticate_password(target.user.as_str(), password.as_str())
                    .await
            }
        }
        .map_err(|e| connect_failed(e.to_string()))?;

        if !authenticated {
            return Err(TargetError::AuthenticationRejected {
                user: target.user.clone(),
                host: target.host.clone(),
            }
            .into());
        }
        tracing::debug!(user = %target.user, host = %target.host, "authenticated");

        Ok(Self {
            handle,
            command_timeout: settings.command_timeout,
            prompt: settings.prompt,
        })
    }

    async fn exec_streaming(&self, command: &str) -> Result<Option<u32>> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .context("opening SSH channel")?;
        channel
            .exec(true, command)
            .await
            .context("sending command")?;

        let mut relay = OutputRelay::new(
            tokio::io::stdout(),
            tokio::io::stderr(),
            &*self.prompt,
            TerminalSecret,
        );
        relay.run(&mut channel).await
    }
}

impl RemoteExec for SshConnection {
    async fn exec(&self, command: &str) -> Result<Option<u32>> {
        tracing::debug!(command, "ssh exec");
        match self.command_timeout {
            None => self.exec_streaming(command).await,
            Some(limit) => {
                if let Ok(result) = tokio::time::timeout(limit, self.exec_streaming(command)).await
                {
                    result
                } else {
                    tracing::warn!(command, secs = limit.as_secs(), "remote command timed out");
                    Ok(None)
                }
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .context("disconnecting")
    }
}

/// Read one line from the local user without echoing it on a terminal.
async fn read_secret_line() -> Result<String> {
    tokio::task::spawn_blocking(|| -> Result<String> {
        if std::io::stdin().is_terminal() {
            Ok(console::Term::stderr().read_secure_line()?)
        } else {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        }
    })
    .await
    .context("password reader panicked")?
    .context("reading password")
}
