use std::io;
use std::path::Path;
use std::process::Command;

use log::info;

#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("Failed to launch mesh compiler `{tool}`: {source}")]
    Launch { tool: String, source: io::Error },
    #[error("Mesh compiler `{tool}` exited with {status}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
    },
}

/// Hands the emitted mesh document to an external, engine-specific compiler
/// and blocks until it exits. Exit code 0 is success; everything else is
/// reported to the caller, which treats it as non-fatal because the document
/// itself is already valid output.
pub(crate) fn compile(tool: &str, document: &Path) -> Result<(), CompileError> {
    info!("Compiling mesh document: `{}`", document.display());

    let status = Command::new(tool)
        .arg(document)
        .status()
        .map_err(|source| CompileError::Launch {
            tool: tool.to_owned(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CompileError::Failed {
            tool: tool.to_owned(),
            status,
        })
    }
}
