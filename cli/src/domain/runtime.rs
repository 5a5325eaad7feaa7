//! Runtime profile: the interpreter, package manager and tool a shadow
//! script needs on the target, and the capability-check commands built from
//! them.
//!
//! Command shapes follow RubyGems conventions (`gem list <tool> -i`,
//! `gem install <tool>`), which is what the default profile targets.

use serde::{Deserialize, Serialize};

use crate::domain::shell::quote;

/// Runtime requirements of a shadow script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeProfile {
    /// Interpreter that runs the staged script, e.g. `ruby`.
    pub interpreter: String,
    /// Package manager used to install the tool, e.g. `gem`.
    pub package_manager: String,
    /// Package providing shaddox itself on the target.
    pub tool: String,
    /// Extension of the staged script file, without the dot.
    pub script_extension: String,
}

impl Default for RuntimeProfile {
    fn default() -> Self {
        Self {
            interpreter: "ruby".to_string(),
            package_manager: "gem".to_string(),
            tool: "shaddox".to_string(),
            script_extension: "rb".to_string(),
        }
    }
}

impl RuntimeProfile {
    #[must_use]
    pub fn interpreter_check(&self) -> String {
        format!("type {} >/dev/null", self.interpreter)
    }

    #[must_use]
    pub fn package_manager_check(&self) -> String {
        format!("type {} >/dev/null", self.package_manager)
    }

    #[must_use]
    pub fn tool_check(&self) -> String {
        format!("{} list {} -i >/dev/null", self.package_manager, self.tool)
    }

    #[must_use]
    pub fn tool_install(&self) -> String {
        format!("{} install {}", self.package_manager, self.tool)
    }

    #[must_use]
    pub fn tool_update(&self) -> String {
        format!("{} update {}", self.package_manager, self.tool)
    }

    /// Command that runs the staged script at `path`.
    #[must_use]
    pub fn run_script(&self, path: &str) -> String {
        format!("{} {}", self.interpreter, quote(path))
    }

    /// Human name of the interpreter for error messages (`ruby` → `Ruby`).
    #[must_use]
    pub fn interpreter_display(&self) -> String {
        capitalize(&self.interpreter)
    }

    /// Human name of the package manager for error messages (`gem` → `Gem`).
    #[must_use]
    pub fn package_manager_display(&self) -> String {
        capitalize(&self.package_manager)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
