//! ASR transformation passes for Fern.
//! Fern 的 ASR 变换 pass。
//!
//! A pass takes the whole translation unit as `&mut Asr` and rewrites it in
//! place. The [`PassManager`] runs passes in the order they were added and,
//! when [`PassOptions::verify`] is set, checks the tree after each one.

mod insert_deallocate;
mod manager;

pub use insert_deallocate::{InsertDeallocate, pass_insert_deallocate};
pub use manager::{DEFAULT_PASSES, PassError, PassManager, available_passes};

use fern_asr::Asr;

/// A whole-unit transformation. / 作用于整个翻译单元的变换。
pub trait Pass {
    /// Name used on the command line and in logs. / 命令行和日志中使用的名称。
    fn name(&self) -> &'static str;

    fn run(&mut self, asr: &mut Asr, options: &PassOptions);
}

/// Options shared by every pass of one run. / 一次运行中所有 pass 共享的选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOptions {
    /// Run the ASR verifier after each pass. / 每个 pass 之后运行 ASR 校验器。
    pub verify: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            verify: cfg!(debug_assertions),
        }
    }
}
