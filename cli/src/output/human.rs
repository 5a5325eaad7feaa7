//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::target_status::TargetReport;
use crate::domain::{RuntimeProfile, ShaddoxConfig};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the result of `shaddox check`.
    pub fn render_check(&self, target: &str, report: &TargetReport, runtime: &RuntimeProfile) {
        self.ctx.header(&format!("Target {target}"));
        if self.ctx.quiet {
            return;
        }
        println!();

        if report.locked {
            self.ctx.warn(&format!(
                "{} exists: a deployment is running or was interrupted",
                report.tmpdir
            ));
        } else {
            self.ctx.success(&format!("{} is free", report.tmpdir));
        }
        self.presence(&runtime.interpreter_display(), report.interpreter);
        self.presence(&runtime.package_manager_display(), report.package_manager);
        if report.package_manager {
            self.presence(&runtime.tool, report.tool);
        } else {
            self.ctx
                .info(&format!("{} not checked without a package manager", runtime.tool));
        }

        println!();
        if report.is_ready() {
            self.ctx.success("Ready to deploy");
        } else if report.locked {
            self.ctx
                .info("Run 'shaddox unlock' or deploy with --force to clear a stale lock");
        } else if report.interpreter && report.package_manager {
            self.ctx
                .info(&format!("{} will be installed on the next deployment", runtime.tool));
        } else {
            self.ctx.warn("A deployment would fail until the runtime is installed");
        }
    }

    fn presence(&self, name: &str, present: bool) {
        if present {
            self.ctx.success(&format!("{name} found"));
        } else {
            self.ctx.warn(&format!("{name} not found"));
        }
    }

    /// Render the current shaddox configuration.
    pub fn render_config(&self, config: &ShaddoxConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.heading)
        );
        println!();
        for (key, value) in config_entries(config) {
            println!("  {:<28} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.emphasis));
        println!(
            "    {:<26} {}",
            "SHADDOX_CONFIG:",
            std::env::var("SHADDOX_CONFIG").unwrap_or_else(|_| "(not set)".to_string())
        );
        println!(
            "    {:<26} {}",
            "RUST_LOG:",
            std::env::var("RUST_LOG").unwrap_or_else(|_| "(not set)".to_string())
        );
    }
}

/// Every settable key with its current value, in `VALID_CONFIG_KEYS` order.
#[must_use]
pub fn config_entries(config: &ShaddoxConfig) -> Vec<(&'static str, String)> {
    let timeout = config
        .deploy
        .command_timeout_secs
        .map_or_else(|| "(none)".to_string(), |s| format!("{s}s"));
    vec![
        ("deploy.tmpdir", config.deploy.tmpdir.clone()),
        ("deploy.keep_tmp_dir", config.deploy.keep_tmp_dir.to_string()),
        ("deploy.command_timeout_secs", timeout),
        ("runtime.interpreter", config.runtime.interpreter.clone()),
        ("runtime.package_manager", config.runtime.package_manager.clone()),
        ("runtime.tool", config.runtime.tool.clone()),
        ("runtime.script_extension", config.runtime.script_extension.clone()),
        ("ssh.port", config.ssh.port.to_string()),
        ("ssh.sudo_prompt", config.ssh.sudo_prompt.clone()),
        ("ssh.host_key_checking", config.ssh.host_key_checking.to_string()),
    ]
}
