//! Command-line options shared by the commands.

use jade_parse::{DiagnosticMode, ReparseConfig, RestartPolicy};

use crate::CliError;

/// Flags accepted after a command name.
///
/// - `--restart=unit|node`: where damaged nodes restart parsing
/// - `--verify`: validate the whole tree after every reparse
/// - `--settled`: report every problem, including transient ones
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub config: ReparseConfig,
    pub mode: DiagnosticMode,
}

impl Options {
    /// Split `args` into options and positional arguments.
    pub fn parse(args: &[String]) -> Result<(Options, Vec<String>), CliError> {
        let mut options = Options::default();
        let mut positional = Vec::new();
        for arg in args {
            if let Some(policy) = arg.strip_prefix("--restart=") {
                options.config.restart = match policy {
                    "unit" => RestartPolicy::UnitBoundary,
                    "node" => RestartPolicy::NodeStart,
                    _ => {
                        return Err(CliError::InvalidArgument {
                            what: "restart policy",
                            value: policy.to_string(),
                        })
                    }
                };
            } else if arg == "--verify" {
                options.config.verify_invariants = true;
            } else if arg == "--settled" {
                options.mode = DiagnosticMode::Settled;
            } else if arg.starts_with("--") {
                return Err(CliError::UnknownOption(arg.clone()));
            } else {
                positional.push(arg.clone());
            }
        }
        Ok((options, positional))
    }
}
