//! Variable substitution for player launch arguments.

use std::collections::HashMap;
use std::path::Path;

/// Variable substitution context for launch argument templates.
///
/// Supports variable substitution in strings using the `{varname}` syntax.
///
/// # Example
///
/// ```
/// use signage_player::TemplateContext;
/// use std::path::Path;
///
/// let ctx = TemplateContext::new().with_launch(
///     Path::new("/tmp/mpv-socket"),
///     Path::new("/tmp/mpv-signage-drm.log"),
///     "drm",
/// );
///
/// assert_eq!(
///     ctx.substitute("--input-ipc-server={ipc_path}"),
///     "--input-ipc-server=/tmp/mpv-socket"
/// );
/// assert_eq!(ctx.substitute("--log-file={log_file}"), "--log-file=/tmp/mpv-signage-drm.log");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// Set launch-related variables.
    ///
    /// This adds the following variables:
    /// - `{ipc_path}` - IPC endpoint the player listens on
    /// - `{log_file}` - Diagnostic log for this launch profile
    /// - `{mode}` - Name of the launch profile
    pub fn with_launch(mut self, ipc_path: &Path, log_file: &Path, mode: &str) -> Self {
        self.vars
            .insert("ipc_path".to_string(), ipc_path.display().to_string());
        self.vars
            .insert("log_file".to_string(), log_file.display().to_string());
        self.vars.insert("mode".to_string(), mode.to_string());
        self
    }

    /// Substitute variables in a string.
    ///
    /// Variables are in the form `{varname}`.
    pub fn substitute(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.vars {
            result = result.replace(&format!("{{{}}}", key), value);
        }
        result
    }

    /// Substitute variables in a list of strings.
    pub fn substitute_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|t| self.substitute(t)).collect()
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}
