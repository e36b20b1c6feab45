/// Top-level configuration stanza.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigSnippet {
    /// Artifact output configuration.
    pub(crate) output: Option<OutputSnippet>,
    /// Agent commands configuration.
    pub(crate) agent: Option<AgentSnippet>,
    /// Document compiler configuration.
    pub(crate) compiler: Option<CompilerSnippet>,
}

/// Config snippet for compiled artifacts.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OutputSnippet {
    /// Directory for intermediate documents and artifacts (default: temp directory)
    pub(crate) directory: Option<String>,
    /// Whether to delete artifacts after each operation (default: false)
    pub(crate) cleanup: Option<bool>,
}

/// Config snippet for agent commands.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AgentSnippet {
    /// Command printing current agent configuration as JSON.
    pub(crate) read_command: Option<Vec<String>>,
    /// Command applying a compiled artifact.
    pub(crate) apply_command: Option<Vec<String>>,
    /// Command removing a stage document.
    pub(crate) remove_command: Option<Vec<String>>,
}

/// Config snippet for the document compiler.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CompilerSnippet {
    pub(crate) command: Option<Vec<String>>,
}
