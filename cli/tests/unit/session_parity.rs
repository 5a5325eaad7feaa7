//! Local and remote sessions must drive the coordinator identically.
//!
//! Both variants run on a scripted shell: runtime checks, installs and the
//! script itself answer from a table, while filesystem commands (`mkdir`,
//! `test`, `rm`, the remote `printf` write) really run under `sh` inside a
//! temp dir, so the lock and cleanup behave as on a real target.

use std::cell::RefCell;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Result;
use shaddox_cli::application::ports::{CommandRunner, SessionOpener};
use shaddox_cli::application::services::deploy::{DeployRequest, deploy};
use shaddox_cli::domain::{DeployError, DeployOptions, DeployPhase, RuntimeProfile, ShadowScript};
use shaddox_cli::infra::command_runner::TokioCommandRunner;
use shaddox_cli::infra::session::{LocalSession, RemoteSession};
use shaddox_cli::infra::ssh::RemoteExec;

use crate::helpers::{RecordingReporter, exit_status};

/// Scripted exit codes for the runtime-facing commands.
#[derive(Debug, Clone, Copy, Default)]
struct Outcomes {
    interpreter: i32,
    package_manager: i32,
    tool_check: i32,
    install: i32,
    update: i32,
    script: i32,
}

struct ScriptedShell {
    outcomes: Outcomes,
    runtime: RuntimeProfile,
    log: RefCell<Vec<String>>,
}

impl ScriptedShell {
    fn new(outcomes: Outcomes) -> Self {
        Self {
            outcomes,
            runtime: RuntimeProfile::default(),
            log: RefCell::new(Vec::new()),
        }
    }

    async fn eval(&self, command: &str) -> Result<i32> {
        self.log.borrow_mut().push(command.to_string());
        let rt = &self.runtime;
        let o = self.outcomes;
        let scripted = if command == rt.interpreter_check() {
            Some(o.interpreter)
        } else if command == rt.package_manager_check() {
            Some(o.package_manager)
        } else if command == rt.tool_check() {
            Some(o.tool_check)
        } else if command == rt.tool_install() {
            Some(o.install)
        } else if command == rt.tool_update() {
            Some(o.update)
        } else if command.starts_with(&format!("{} ", rt.interpreter)) {
            Some(o.script)
        } else {
            None
        };
        if let Some(code) = scripted {
            return Ok(code);
        }
        let status = TokioCommandRunner::new()
            .run_status("sh", &["-c", command])
            .await?;
        Ok(status.code().unwrap_or(1))
    }
}

// ── Local variant: fake CommandRunner ───────────────────────────────────────

struct ScriptedRunner<'a>(&'a ScriptedShell);

impl CommandRunner for ScriptedRunner<'_> {
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        assert_eq!(program, "sh");
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], "-c");
        Ok(exit_status(self.0.eval(args[1]).await?))
    }

    async fn run_status_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<ExitStatus> {
        self.run_status(program, args).await
    }
}

struct LocalOpener<'a>(&'a ScriptedShell);

impl<'a> SessionOpener for LocalOpener<'a> {
    type Session = LocalSession<ScriptedRunner<'a>>;

    async fn open(&self) -> Result<Self::Session> {
        Ok(LocalSession::new(ScriptedRunner(self.0), None))
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}

// ── Remote variant: fake RemoteExec ─────────────────────────────────────────

struct ScriptedExec<'a>(&'a ScriptedShell);

impl RemoteExec for ScriptedExec<'_> {
    async fn exec(&self, command: &str) -> Result<Option<u32>> {
        let code = self.0.eval(command).await?;
        Ok(u32::try_from(code).ok())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

struct RemoteOpener<'a>(&'a ScriptedShell);

impl<'a> SessionOpener for RemoteOpener<'a> {
    type Session = RemoteSession<ScriptedExec<'a>>;

    async fn open(&self) -> Result<Self::Session> {
        Ok(RemoteSession::new(ScriptedExec(self.0)))
    }

    fn describe(&self) -> String {
        "remote".to_string()
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

/// What a deployment looked like from the caller's side.
#[derive(Debug, PartialEq)]
struct Observed {
    phases: Vec<DeployPhase>,
    error: Option<String>,
    staging_dir_exists: bool,
    script_ran: bool,
}

fn classify(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::AlreadyRunning { .. }) => "AlreadyRunning".to_string(),
        Some(DeployError::MissingDependency { dependency, .. }) => {
            format!("MissingDependency({dependency})")
        }
        Some(DeployError::StagingFailed { .. }) => "StagingFailed".to_string(),
        Some(DeployError::ExecutionFailed { .. }) => "ExecutionFailed".to_string(),
        None => format!("other: {err}"),
    }
}

async fn observe(
    opener: &impl SessionOpener,
    shell: &ScriptedShell,
    tmpdir: &Path,
    options: &DeployOptions,
) -> Observed {
    let script = ShadowScript::new("puts 'it''s fine'\n");
    let runtime = RuntimeProfile::default();
    let request = DeployRequest {
        script: &script,
        options,
        runtime: &runtime,
    };
    let reporter = RecordingReporter::default();
    let result = deploy(opener, &request, &reporter).await;
    let script_ran = shell
        .log
        .borrow()
        .iter()
        .any(|c| c.starts_with(&format!("{} ", runtime.interpreter)));
    Observed {
        phases: reporter.phases(),
        error: result.as_ref().err().map(classify),
        staging_dir_exists: tmpdir.exists(),
        script_ran,
    }
}

async fn compare(outcomes: Outcomes, pre_locked: bool, keep_tmp_dir: bool) {
    let mut observed = Vec::new();
    for remote in [false, true] {
        let dir = tempfile::tempdir().expect("tempdir");
        let tmpdir = dir.path().join("stage");
        if pre_locked {
            std::fs::create_dir(&tmpdir).expect("pre-lock");
        }
        let options = DeployOptions {
            tmpdir: tmpdir.to_string_lossy().into_owned(),
            force: false,
            keep_tmp_dir,
        };
        let shell = ScriptedShell::new(outcomes);
        let seen = if remote {
            observe(&RemoteOpener(&shell), &shell, &tmpdir, &options).await
        } else {
            observe(&LocalOpener(&shell), &shell, &tmpdir, &options).await
        };
        observed.push(seen);
    }
    assert_eq!(
        observed[0], observed[1],
        "local and remote diverged for {outcomes:?} (pre_locked={pre_locked}, keep={keep_tmp_dir})"
    );
}

#[tokio::test]
async fn test_parity_happy_path() {
    compare(Outcomes::default(), false, false).await;
}

#[tokio::test]
async fn test_parity_happy_path_keep_tmp_dir() {
    compare(Outcomes::default(), false, true).await;
}

#[tokio::test]
async fn test_parity_already_running() {
    compare(Outcomes::default(), true, false).await;
}

#[tokio::test]
async fn test_parity_missing_interpreter() {
    let outcomes = Outcomes {
        interpreter: 1,
        ..Outcomes::default()
    };
    compare(outcomes, false, false).await;
}

#[tokio::test]
async fn test_parity_missing_package_manager() {
    let outcomes = Outcomes {
        package_manager: 127,
        ..Outcomes::default()
    };
    compare(outcomes, false, false).await;
}

#[tokio::test]
async fn test_parity_update_fails() {
    let outcomes = Outcomes {
        update: 1,
        ..Outcomes::default()
    };
    compare(outcomes, false, false).await;
}

#[tokio::test]
async fn test_parity_tool_cannot_be_installed() {
    let outcomes = Outcomes {
        tool_check: 1,
        install: 1,
        ..Outcomes::default()
    };
    compare(outcomes, false, false).await;
}

#[tokio::test]
async fn test_parity_script_fails() {
    let outcomes = Outcomes {
        script: 2,
        ..Outcomes::default()
    };
    compare(outcomes, false, false).await;
    compare(outcomes, false, true).await;
}

#[tokio::test]
async fn test_remote_write_stages_exact_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tmpdir = dir.path().join("stage");
    let shell = ScriptedShell::new(Outcomes::default());
    let options = DeployOptions {
        tmpdir: tmpdir.to_string_lossy().into_owned(),
        force: false,
        keep_tmp_dir: true,
    };
    let content = "#!/usr/bin/env ruby\nputs \"$HOME 'q' \\\\ %s\"\n";
    let script = ShadowScript::new(content);
    let runtime = RuntimeProfile::default();
    let request = DeployRequest {
        script: &script,
        options: &options,
        runtime: &runtime,
    };

    deploy(&RemoteOpener(&shell), &request, &RecordingReporter::default())
        .await
        .expect("deploy");

    let staged = std::fs::read_to_string(tmpdir.join("shadow_script.rb")).expect("staged");
    assert_eq!(staged, content);
}
