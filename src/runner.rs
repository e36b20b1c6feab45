//! Operation runner.
//!
//! Every operation goes through the same sequence against a single
//! target: read the current snapshot, edit it, synthesize the full
//! document, compile it, apply it. Any failure aborts the rest of
//! the sequence.

use crate::agent::{Compiler, DocumentStage, LcmAgent};
use crate::document;
use crate::operation::Operation;
use crate::target::Target;
use failure::{Fallible, ResultExt};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffix of compiled meta-configuration artifacts.
static ARTIFACT_SUFFIX: &str = "meta.mof";

/// Suffix of synthesized document sources.
static SOURCE_SUFFIX: &str = "meta.conf";

pub(crate) struct Runner<'a> {
    agent: &'a dyn LcmAgent,
    compiler: &'a dyn Compiler,
    output_dir: PathBuf,
    cleanup: bool,
}

impl<'a> Runner<'a> {
    pub(crate) fn new(
        agent: &'a dyn LcmAgent,
        compiler: &'a dyn Compiler,
        output_dir: PathBuf,
        cleanup: bool,
    ) -> Self {
        Self {
            agent,
            compiler,
            output_dir,
            cleanup,
        }
    }

    /// Run a single operation against a target.
    pub(crate) fn run(&self, target: &Target, op: &Operation) -> Fallible<()> {
        let host = target.host_identifier();
        info!("running '{}' against '{}'", op.name(), host);

        // Cleanup happens on drop, whatever the outcome.
        let files = Artifacts::new(&self.output_dir, host, self.cleanup);

        let mut snapshot = self.agent.read_snapshot(host)?;
        debug!(
            "current configuration has {} partial configuration(s)",
            snapshot.partial_configurations.len()
        );

        op.edit(&mut snapshot)?;
        let body = document::synthesize(&snapshot)?;
        let text = document::envelope(host, &body);
        trace!("synthesized document:\n{}", text);

        fs::create_dir_all(&self.output_dir).context(format!(
            "failed to create output directory '{}'",
            self.output_dir.display()
        ))?;
        fs::write(&files.source, text).context(format!(
            "failed to write document '{}'",
            files.source.display()
        ))?;

        // A leftover artifact must never pass for fresh compiler output.
        remove_if_exists(&files.artifact)?;
        self.compiler.compile(host, &files.source, &files.artifact)?;
        debug!("compiled artifact {:?}", files.artifact);

        self.agent.apply_meta(host, &files.artifact)?;
        info!("applied '{}' to '{}'", op.name(), host);

        if op.clears_history() {
            for stage in DocumentStage::ALL.iter() {
                self.agent.remove_document(host, *stage)?;
                debug!("removed '{}' document", stage);
            }
        }

        Ok(())
    }
}

/// Compiled artifact path for a host.
pub(crate) fn artifact_path(output_dir: &Path, host: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", host, ARTIFACT_SUFFIX))
}

/// Remove a file, if present.
fn remove_if_exists(path: &Path) -> Fallible<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed stale {:?}", path);
            Ok(())
        }
        Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format_err!(
            "failed to remove '{}': {}",
            path.display(),
            e
        )),
    }
}

/// Intermediate files for a single run.
struct Artifacts {
    source: PathBuf,
    artifact: PathBuf,
    cleanup: bool,
}

impl Artifacts {
    fn new(output_dir: &Path, host: &str, cleanup: bool) -> Self {
        Self {
            source: output_dir.join(format!("{}.{}", host, SOURCE_SUFFIX)),
            artifact: artifact_path(output_dir, host),
            cleanup,
        }
    }
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        if !self.cleanup {
            return;
        }
        for path in &[&self.source, &self.artifact] {
            match fs::remove_file(path) {
                Ok(()) => trace!("removed {:?}", path),
                Err(ref e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove {:?}: {}", path, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{PartialChange, SettingsChange};
    use crate::errors::LcmError;
    use crate::operation::{OpAddPartial, OpRemovePartial, OpReset, OpSetSetting};
    use crate::state::{PartialConfigurationEntry, PartialId, RefreshMode, Snapshot};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeAgent {
        snapshot: Snapshot,
        unreachable: bool,
        reject_apply: bool,
        applied: RefCell<Vec<PathBuf>>,
        removed: RefCell<Vec<DocumentStage>>,
    }

    impl LcmAgent for FakeAgent {
        fn read_snapshot(&self, host: &str) -> Fallible<Snapshot> {
            if self.unreachable {
                let err = LcmError::TargetUnreachable {
                    host: host.to_string(),
                    reason: "no route to host".to_string(),
                };
                return Err(err.into());
            }
            Ok(self.snapshot.clone())
        }

        fn apply_meta(&self, _host: &str, artifact: &Path) -> Fallible<()> {
            if self.reject_apply {
                return Err(LcmError::Apply("invalid artifact".to_string()).into());
            }
            self.applied.borrow_mut().push(artifact.to_path_buf());
            Ok(())
        }

        fn remove_document(&self, _host: &str, stage: DocumentStage) -> Fallible<()> {
            self.removed.borrow_mut().push(stage);
            Ok(())
        }
    }

    /// Copies the document text into the artifact.
    #[derive(Default)]
    struct FakeCompiler {
        reject: bool,
        compiled: RefCell<Vec<String>>,
    }

    impl Compiler for FakeCompiler {
        fn compile(&self, _host: &str, source: &Path, artifact: &Path) -> Fallible<()> {
            let text = fs::read_to_string(source)?;
            if self.reject {
                return Err(LcmError::Compilation("syntax error".to_string()).into());
            }
            fs::write(artifact, &text)?;
            self.compiled.borrow_mut().push(text);
            Ok(())
        }
    }

    fn id(name: &str) -> PartialId {
        PartialId::parse(name).unwrap()
    }

    fn snapshot() -> Snapshot {
        let mut a = PartialConfigurationEntry::new(id("A"));
        a.refresh_mode = Some(RefreshMode::Push);
        let mut b = PartialConfigurationEntry::new(id("B"));
        b.refresh_mode = Some(RefreshMode::Push);
        b.depends_on = vec![id("A")];
        Snapshot {
            partial_configurations: vec![a, b],
            ..Snapshot::default()
        }
    }

    fn target() -> Target {
        Target::host("node01").unwrap()
    }

    #[test]
    fn set_setting_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        let op = Operation::SetSetting(OpSetSetting {
            change: SettingsChange {
                reboot_node_if_needed: Some(true),
                ..SettingsChange::default()
            },
        });
        runner.run(&target(), &op).unwrap();

        let artifact = dir.path().join("node01.meta.mof");
        assert_eq!(*agent.applied.borrow(), vec![artifact.clone()]);
        assert!(artifact.exists());
        assert!(agent.removed.borrow().is_empty());

        let compiled = compiler.compiled.borrow();
        assert!(compiled[0].contains("Node 'node01'"));
        assert!(compiled[0].contains("RebootNodeIfNeeded = true"));
        assert!(compiled[0].contains("PartialConfiguration A"));
        assert!(compiled[0].contains("DependsOn = '[PartialConfiguration]A'"));
    }

    #[test]
    fn remove_partial_prunes_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), true);

        let op = Operation::RemovePartial(OpRemovePartial { id: id("A") });
        runner.run(&target(), &op).unwrap();

        let compiled = compiler.compiled.borrow();
        assert!(!compiled[0].contains("PartialConfiguration A"));
        assert!(!compiled[0].contains("DependsOn"));
        assert!(!dir.path().join("node01.meta.mof").exists());
        assert!(!dir.path().join("node01.meta.conf").exists());
    }

    #[test]
    fn duplicate_add_still_applies() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        let op = Operation::AddPartial(OpAddPartial {
            id: id("B"),
            refresh_mode: RefreshMode::Pull,
            fields: PartialChange::default(),
        });
        runner.run(&target(), &op).unwrap();

        assert_eq!(agent.applied.borrow().len(), 1);
        let compiled = compiler.compiled.borrow();
        assert_eq!(compiled[0].matches("PartialConfiguration B").count(), 1);
        assert!(!compiled[0].contains("RefreshMode = 'Pull'"));
    }

    #[test]
    fn reset_clears_history() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap();

        assert_eq!(
            *agent.removed.borrow(),
            vec![
                DocumentStage::Current,
                DocumentStage::Previous,
                DocumentStage::Pending
            ]
        );
        assert!(!compiler.compiled.borrow()[0].contains("PartialConfiguration"));
    }

    #[test]
    fn unreachable_target_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            unreachable: true,
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), true);

        let err = runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap_err();
        match err.downcast_ref::<LcmError>() {
            Some(LcmError::TargetUnreachable { host, .. }) => assert_eq!(host, "node01"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(compiler.compiled.borrow().is_empty());
        assert!(agent.applied.borrow().is_empty());
    }

    #[test]
    fn compilation_error_skips_apply() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler {
            reject: true,
            ..FakeCompiler::default()
        };
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), true);

        let err = runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LcmError>(),
            Some(&LcmError::Compilation("syntax error".to_string()))
        );
        assert!(agent.applied.borrow().is_empty());
        assert!(agent.removed.borrow().is_empty());
        assert!(!dir.path().join("node01.meta.conf").exists());
    }

    #[test]
    fn apply_error_keeps_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            reject_apply: true,
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        let err = runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LcmError>(),
            Some(&LcmError::Apply("invalid artifact".to_string()))
        );
        assert!(agent.removed.borrow().is_empty());
        assert!(artifact_path(dir.path(), "node01").exists());
    }

    #[cfg(unix)]
    #[test]
    fn stale_artifact_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_path(dir.path(), "node01");
        fs::write(&artifact, "stale").unwrap();

        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        // Exits successfully without writing anything.
        let compiler = crate::agent::CommandCompiler {
            command: crate::agent::CommandLine::new(vec!["true".to_string()]).unwrap(),
        };
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        let err = runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap_err();
        match err.downcast_ref::<LcmError>() {
            Some(LcmError::Compilation(_)) => {}
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(agent.applied.borrow().is_empty());
        assert!(!artifact.exists());
    }

    #[test]
    fn stale_artifact_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_path(dir.path(), "node01");
        fs::write(&artifact, "stale").unwrap();

        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        runner
            .run(&target(), &Operation::Reset(OpReset {}))
            .unwrap();
        let content = fs::read_to_string(&artifact).unwrap();
        assert!(content.contains("Node 'node01'"));
    }

    #[test]
    fn missing_partial_aborts_before_compile() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent {
            snapshot: snapshot(),
            ..FakeAgent::default()
        };
        let compiler = FakeCompiler::default();
        let runner = Runner::new(&agent, &compiler, dir.path().to_path_buf(), false);

        let op = Operation::RemovePartial(OpRemovePartial { id: id("Z") });
        let err = runner.run(&target(), &op).unwrap_err();
        assert_eq!(err.to_string(), "partial configuration 'Z' not found");
        assert!(compiler.compiled.borrow().is_empty());
    }
}
