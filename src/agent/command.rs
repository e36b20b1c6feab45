//! Collaborators backed by external programs.

use super::{Compiler, DocumentStage, LcmAgent};
use crate::errors::LcmError;
use crate::state::Snapshot;
use failure::Fallible;
use std::path::Path;
use std::process::{Command, Output};

/// Command line template, with `{name}` placeholders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct CommandLine(Vec<String>);

impl CommandLine {
    pub(crate) fn new(argv: Vec<String>) -> Fallible<Self> {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self(argv)),
            _ => bail!("empty command line"),
        }
    }

    /// Placeholder names used in this template, in order of appearance.
    pub(crate) fn placeholders(&self) -> Vec<&str> {
        let mut names = vec![];
        for arg in &self.0 {
            let mut rest = arg.as_str();
            while let Some(start) = rest.find('{') {
                let tail = &rest[start + 1..];
                match tail.find('}') {
                    Some(end) => {
                        names.push(&tail[..end]);
                        rest = &tail[end + 1..];
                    }
                    None => break,
                }
            }
        }
        names
    }

    /// Ensure this template only uses known placeholders.
    pub(crate) fn ensure_placeholders(&self, allowed: &[&str]) -> Fallible<()> {
        if let Some(unknown) = self.placeholders().into_iter().find(|p| !allowed.contains(p)) {
            bail!(
                "unknown placeholder '{{{}}}' in command '{}' (allowed: {})",
                unknown,
                self.0.join(" "),
                allowed.join(", ")
            );
        }
        Ok(())
    }

    /// Substitute placeholders.
    ///
    /// Each template argument is scanned once, so placeholder-like text
    /// inside substituted values is kept verbatim.
    pub(crate) fn expand(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.0.iter().map(|arg| expand_arg(arg, vars)).collect()
    }

    /// Run this command to completion.
    ///
    /// On failure, the error carries a human-readable reason.
    fn run(&self, vars: &[(&str, &str)]) -> Result<Output, String> {
        let argv = self.expand(vars);
        debug!("running command: {:?}", argv);

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .map_err(|e| format!("failed to run '{}': {}", argv[0], e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = if stderr.trim().is_empty() {
                format!("'{}' failed with {}", argv[0], output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(reason);
        }

        trace!(
            "command '{}' succeeded, {} bytes on stdout",
            argv[0],
            output.stdout.len()
        );
        Ok(output)
    }
}

fn expand_arg(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find('{') {
        let tail = &rest[start + 1..];
        let end = match tail.find('}') {
            Some(end) => end,
            None => break,
        };
        out.push_str(&rest[..start]);
        let name = &tail[..end];
        match vars.iter().find(|(var, _)| *var == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Agent driven through external commands.
#[derive(Clone, Debug)]
pub(crate) struct CommandAgent {
    /// Prints the current agent configuration as JSON, on stdout.
    pub(crate) read: CommandLine,
    /// Applies a compiled artifact.
    pub(crate) apply: CommandLine,
    /// Removes a document at a given stage, if configured.
    pub(crate) remove: Option<CommandLine>,
}

impl LcmAgent for CommandAgent {
    fn read_snapshot(&self, host: &str) -> Fallible<Snapshot> {
        let output = self
            .read
            .run(&[("host", host)])
            .map_err(|reason| LcmError::TargetUnreachable {
                host: host.to_string(),
                reason,
            })?;
        Snapshot::from_json(&output.stdout)
    }

    fn apply_meta(&self, host: &str, artifact: &Path) -> Fallible<()> {
        let artifact = artifact.to_string_lossy();
        self.apply
            .run(&[("host", host), ("artifact", &*artifact)])
            .map_err(LcmError::Apply)?;
        Ok(())
    }

    fn remove_document(&self, host: &str, stage: DocumentStage) -> Fallible<()> {
        let remove = match self.remove {
            Some(ref cmd) => cmd,
            None => bail!("no document removal command configured"),
        };
        let stage = stage.to_string();
        remove
            .run(&[("host", host), ("stage", stage.as_str())])
            .map_err(LcmError::Apply)?;
        Ok(())
    }
}

/// Compiler driven through an external command.
#[derive(Clone, Debug)]
pub(crate) struct CommandCompiler {
    pub(crate) command: CommandLine,
}

impl Compiler for CommandCompiler {
    fn compile(&self, host: &str, source: &Path, artifact: &Path) -> Fallible<()> {
        let input = source.to_string_lossy();
        let output = artifact.to_string_lossy();
        self.command
            .run(&[("host", host), ("input", &*input), ("output", &*output)])
            .map_err(LcmError::Compilation)?;

        if !artifact.exists() {
            let reason = format!("no artifact produced at '{}'", artifact.display());
            return Err(LcmError::Compilation(reason).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(argv: &[&str]) -> CommandLine {
        CommandLine::new(argv.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn reject_empty_command() {
        CommandLine::new(vec![]).unwrap_err();
        CommandLine::new(vec!["  ".to_string()]).unwrap_err();
    }

    #[test]
    fn placeholders() {
        let line = cmd(&["compile", "--in={input}", "{output}", "{host}:{output}", "{open"]);
        assert_eq!(line.placeholders(), vec!["input", "output", "host", "output"]);

        line.ensure_placeholders(&["host", "input", "output"]).unwrap();
        line.ensure_placeholders(&["host", "input"]).unwrap_err();
    }

    #[test]
    fn expand_placeholders() {
        let line = cmd(&["apply", "--host", "{host}", "{artifact}"]);
        let argv = line.expand(&[("host", "node01"), ("artifact", "/tmp/node01.meta.mof")]);
        assert_eq!(argv, vec!["apply", "--host", "node01", "/tmp/node01.meta.mof"]);
    }

    #[test]
    fn expand_values_verbatim() {
        let line = cmd(&["apply", "{host}", "{artifact}", "{unknown}", "x{host}y", "{open"]);
        let argv = line.expand(&[("host", "{artifact}"), ("artifact", "/tmp/x.meta.mof")]);
        assert_eq!(
            argv,
            vec![
                "apply",
                "{artifact}",
                "/tmp/x.meta.mof",
                "{unknown}",
                "x{artifact}y",
                "{open"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn read_snapshot_from_command() {
        let agent = CommandAgent {
            read: cmd(&[
                "sh",
                "-c",
                r#"echo '{"Settings": {"RebootNodeIfNeeded": true}}'"#,
            ]),
            apply: cmd(&["true"]),
            remove: None,
        };

        let snapshot = agent.read_snapshot("node01").unwrap();
        assert_eq!(snapshot.settings.reboot_node_if_needed, Some(true));

        agent.apply_meta("node01", Path::new("/nonexistent")).unwrap();
        agent
            .remove_document("node01", DocumentStage::Pending)
            .unwrap_err();
    }

    #[cfg(unix)]
    #[test]
    fn unreachable_target() {
        let agent = CommandAgent {
            read: cmd(&["sh", "-c", "echo 'connection refused' >&2; exit 1"]),
            apply: cmd(&["false"]),
            remove: Some(cmd(&["false"])),
        };

        let err = agent.read_snapshot("node01").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LcmError>(),
            Some(&LcmError::TargetUnreachable {
                host: "node01".to_string(),
                reason: "connection refused".to_string(),
            })
        );

        let err = agent.apply_meta("node01", Path::new("x")).unwrap_err();
        match err.downcast_ref::<LcmError>() {
            Some(LcmError::Apply(_)) => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn compiler_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("node01.meta.conf");
        let artifact = dir.path().join("node01.meta.mof");
        std::fs::write(&source, "Settings\n{\n}\n").unwrap();

        let failing = CommandCompiler {
            command: cmd(&["sh", "-c", "echo 'unexpected token' >&2; exit 3"]),
        };
        let err = failing.compile("node01", &source, &artifact).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LcmError>(),
            Some(&LcmError::Compilation("unexpected token".to_string()))
        );

        let silent = CommandCompiler {
            command: cmd(&["true"]),
        };
        let err = silent.compile("node01", &source, &artifact).unwrap_err();
        assert!(err.to_string().contains("no artifact produced"));

        let copying = CommandCompiler {
            command: cmd(&["cp", "{input}", "{output}"]),
        };
        copying.compile("node01", &source, &artifact).unwrap();
        assert!(artifact.exists());
    }
}
