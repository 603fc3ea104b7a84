//! Startup command sequence.
//!
//! The standard sequence, in interpreter syntax:
//!
//! 1. prepend every entry of the search-path environment variable that is not
//!    already on the interpreter's search path (first occurrence wins)
//! 2. set the process identity argument
//! 3. import the startup module

use motus_common::consts::{DEFAULT_IDENTITY, DEFAULT_PATH_ENV, DEFAULT_STARTUP_MODULE};

/// Ordered startup commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupScript {
    commands: Vec<String>,
}

impl StartupScript {
    /// Standard sequence for the given environment variable, identity and module.
    ///
    /// Callers validate `identity` and `module` (see `config::StartupSection`);
    /// they are spliced into the commands verbatim.
    pub fn standard(path_env: &str, identity: &str, module: &str) -> Self {
        let commands = vec![
            "import sys, os".to_string(),
            format!("search_path_env = os.environ.get('{path_env}', '')"),
            "path = []".to_string(),
            "for p in search_path_env.split(os.pathsep):\n  \
             if p and p not in sys.path and p not in path:\n    \
             path.append(p)"
                .to_string(),
            "path.extend(sys.path)".to_string(),
            "sys.path = path".to_string(),
            format!("sys.argv = ['{identity}']"),
            format!("import {module}"),
        ];
        Self { commands }
    }

    /// Explicit command list, run verbatim in order.
    pub fn from_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for StartupScript {
    fn default() -> Self {
        Self::standard(DEFAULT_PATH_ENV, DEFAULT_IDENTITY, DEFAULT_STARTUP_MODULE)
    }
}
