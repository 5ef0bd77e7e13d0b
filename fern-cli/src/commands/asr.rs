//! The `fern asr` and `fern passes` commands.

use fern_pass::{PassManager, PassOptions, available_passes};

use super::{lower_source, read_source};
use crate::output;

/// Lower `file`, run `passes` (the default set when empty) and print the ASR.
pub fn run(file: &str, passes: &[String], verify: bool, verbose: bool) -> Result<(), String> {
    let options = PassOptions { verify };
    let mut manager = if passes.is_empty() {
        PassManager::with_default_passes(options)
    } else {
        PassManager::from_names(passes, options).map_err(|e| e.to_string())?
    };

    let source = read_source(file)?;
    let mut asr = lower_source(&source, file)?;
    if verify {
        fern_asr::verify(&asr).map_err(|e| format!("lowered ASR is malformed: {e}"))?;
    }

    manager.run(&mut asr);
    print!("{}", fern_asr::render(&asr));

    if verbose {
        output::info(&format!(
            "ran {} pass(es): {}; {} bytes in the ASR arenas",
            manager.len(),
            manager.pass_names().join(", "),
            asr.allocated_bytes()
        ));
    }
    Ok(())
}

pub fn list_passes() -> Result<(), String> {
    for (name, description) in available_passes() {
        println!("{name:<20} {description}");
    }
    Ok(())
}
