use crate::config::snippets;
use failure::{Fallible, ResultExt};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Runtime configuration holding environmental inputs.
#[derive(Debug, Default, Serialize)]
pub(crate) struct ConfigInput {
    pub(crate) output: OutputInput,
    pub(crate) agent: AgentInput,
    pub(crate) compiler: CompilerInput,
}

impl ConfigInput {
    /// Read config snippets and merge them into a single config.
    ///
    /// Snippets are `*.toml` files, read in lexicographic order of their
    /// file names. A snippet in a later directory masks a snippet with
    /// the same file name in an earlier one.
    pub(crate) fn read_config(dirs: &[PathBuf]) -> Fallible<Self> {
        let paths = collect_snippets(dirs)?;

        let mut snips = vec![];
        for path in paths.values() {
            trace!("reading config snippet from {:?}", path);
            let content = std::fs::read(path)
                .context(format!("failed to read file '{}'", path.display()))?;
            let snippet: snippets::ConfigSnippet = toml::from_slice(&content)
                .context(format!("failed to parse TOML in '{}'", path.display()))?;
            snips.push(snippet);
        }

        let cfg = Self::merge_snippets(snips);
        match toml::to_string_pretty(&cfg) {
            Ok(text) => debug!("Configuration input:\n{}", text),
            Err(e) => debug!("failed to dump configuration input: {}", e),
        }

        Ok(cfg)
    }

    /// Merge multiple snippets into a single configuration.
    fn merge_snippets(snippets: Vec<snippets::ConfigSnippet>) -> Self {
        let mut outputs = vec![];
        let mut agents = vec![];
        let mut compilers = vec![];

        for snip in snippets {
            if let Some(o) = snip.output {
                outputs.push(o);
            }
            if let Some(a) = snip.agent {
                agents.push(a);
            }
            if let Some(c) = snip.compiler {
                compilers.push(c);
            }
        }

        Self {
            output: OutputInput::from_snippets(outputs),
            agent: AgentInput::from_snippets(agents),
            compiler: CompilerInput::from_snippets(compilers),
        }
    }
}

/// Find all snippet files, keyed by file name.
fn collect_snippets(dirs: &[PathBuf]) -> Fallible<BTreeMap<OsString, PathBuf>> {
    let mut found = BTreeMap::new();
    for dir in dirs {
        if !dir.is_dir() {
            trace!("skipping missing config directory {:?}", dir);
            continue;
        }
        let entries = std::fs::read_dir(dir)
            .context(format!("failed to list directory '{}'", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if is_snippet(&path) {
                if let Some(name) = path.file_name() {
                    found.insert(name.to_os_string(), path.clone());
                }
            }
        }
    }
    Ok(found)
}

fn is_snippet(path: &Path) -> bool {
    path.is_file() && path.extension().map_or(false, |ext| ext == "toml")
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct OutputInput {
    pub(crate) directory: String,
    pub(crate) cleanup: bool,
}

impl OutputInput {
    fn from_snippets(snippets: Vec<snippets::OutputSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(d) = snip.directory {
                cfg.directory = d;
            }
            if let Some(c) = snip.cleanup {
                cfg.cleanup = c;
            }
        }

        cfg
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct AgentInput {
    pub(crate) read_command: Vec<String>,
    pub(crate) apply_command: Vec<String>,
    pub(crate) remove_command: Vec<String>,
}

impl AgentInput {
    fn from_snippets(snippets: Vec<snippets::AgentSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(r) = snip.read_command {
                cfg.read_command = r;
            }
            if let Some(a) = snip.apply_command {
                cfg.apply_command = a;
            }
            if let Some(r) = snip.remove_command {
                cfg.remove_command = r;
            }
        }

        cfg
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct CompilerInput {
    pub(crate) command: Vec<String>,
}

impl CompilerInput {
    fn from_snippets(snippets: Vec<snippets::CompilerSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(c) = snip.command {
                cfg.command = c;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn merge_in_order() {
        let vendor = tempfile::tempdir().unwrap();
        let admin = tempfile::tempdir().unwrap();

        fs::write(
            vendor.path().join("10-agent.toml"),
            r#"
[agent]
read_command = ["lcm-read", "{host}"]
apply_command = ["lcm-apply", "{host}", "{artifact}"]

[output]
cleanup = true
"#,
        )
        .unwrap();
        fs::write(
            vendor.path().join("20-compiler.toml"),
            "[compiler]\ncommand = [\"lcm-compile\", \"{input}\", \"{output}\"]\n",
        )
        .unwrap();
        // Masks the vendor snippet with the same name.
        fs::write(
            admin.path().join("20-compiler.toml"),
            "[output]\ndirectory = \"/var/tmp/lcm\"\n",
        )
        .unwrap();
        fs::write(admin.path().join("README"), "not a snippet").unwrap();

        let dirs = vec![
            vendor.path().to_path_buf(),
            PathBuf::from("/nonexistent/lcmconf"),
            admin.path().to_path_buf(),
        ];
        let cfg = ConfigInput::read_config(&dirs).unwrap();

        assert_eq!(cfg.agent.read_command, vec!["lcm-read", "{host}"]);
        assert!(cfg.agent.remove_command.is_empty());
        assert!(cfg.compiler.command.is_empty());
        assert_eq!(cfg.output.directory, "/var/tmp/lcm");
        assert!(cfg.output.cleanup);
    }

    #[test]
    fn later_snippets_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00-base.toml"), "[output]\ncleanup = true\n").unwrap();
        fs::write(dir.path().join("50-local.toml"), "[output]\ncleanup = false\n").unwrap();

        let cfg = ConfigInput::read_config(&[dir.path().to_path_buf()]).unwrap();
        assert!(!cfg.output.cleanup);
    }

    #[test]
    fn reject_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00-typo.toml"), "[output]\ncleanpu = true\n").unwrap();

        ConfigInput::read_config(&[dir.path().to_path_buf()]).unwrap_err();
    }
}
