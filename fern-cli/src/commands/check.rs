//! The `fern check` command.
//! `fern check` 命令。

use super::{lower_source, read_source};
use crate::output;

/// Run the whole front end on a file, without printing its trees.
/// 对文件运行完整的前端检查。
pub fn run(file: &str, verbose: bool, quiet: bool) -> Result<(), String> {
    let source = read_source(file)?;

    // Lex, parse and lower
    // 词法分析、解析与降级
    let asr = lower_source(&source, file)?;

    if verbose {
        output::info(&format!("Lowered {} scope(s)", asr.scopes().len()));
    }

    fern_asr::verify(&asr).map_err(|e| format!("lowered ASR is malformed: {e}"))?;

    if !quiet {
        output::success("OK - No errors found");
    }
    Ok(())
}
