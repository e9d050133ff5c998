//! yband — rewrites G-code so Y-axis speeds stay out of a resonance band.

pub mod config;
pub mod error;
pub mod gcode;
pub mod kinematics;
pub mod program;
pub mod rewrite;

pub use config::AvoidanceConfig;
pub use error::{Error, Result};
pub use program::Program;
pub use rewrite::{RewriteReport, Rewriter};

use std::path::Path;

/// Load `path`, rewrite it, and replace it with the result.
///
/// The file is read completely before anything is written and replaced in a
/// single step, so a failure leaves the original intact.
pub fn process_file(path: &Path, config: &AvoidanceConfig) -> Result<RewriteReport> {
    let rewriter = Rewriter::new(config)?;
    let mut program = Program::load(path)?;
    let report = rewriter.rewrite(&mut program);
    program.save(path)?;
    Ok(report)
}
