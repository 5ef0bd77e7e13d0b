//! Pass registration and execution.
//! Pass 的注册与执行。

use fern_asr::Asr;
use fern_common::ice;
use thiserror::Error;
use tracing::debug;

use crate::{InsertDeallocate, Pass, PassOptions};

/// Passes run by [`PassManager::with_default_passes`], in order.
pub const DEFAULT_PASSES: &[&str] = &["insert_deallocate"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("unknown pass `{name}`")]
    UnknownPass { name: String },
}

struct PassEntry {
    name: &'static str,
    description: &'static str,
    create: fn() -> Box<dyn Pass>,
}

fn create_insert_deallocate() -> Box<dyn Pass> {
    Box::new(InsertDeallocate::default())
}

const REGISTRY: &[PassEntry] = &[PassEntry {
    name: "insert_deallocate",
    description: "release local allocatable arrays at the end of their scope",
    create: create_insert_deallocate,
}];

/// Name and description of every registered pass.
pub fn available_passes() -> impl Iterator<Item = (&'static str, &'static str)> {
    REGISTRY.iter().map(|entry| (entry.name, entry.description))
}

/// Runs passes strictly in the order they were added.
/// 严格按照添加顺序运行 pass。
pub struct PassManager {
    options: PassOptions,
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new(options: PassOptions) -> Self {
        Self {
            options,
            passes: Vec::new(),
        }
    }

    pub fn with_default_passes(options: PassOptions) -> Self {
        let mut manager = Self::new(options);
        for entry in REGISTRY {
            if DEFAULT_PASSES.contains(&entry.name) {
                manager.passes.push((entry.create)());
            }
        }
        manager
    }

    /// Build a manager running the named passes in the given order.
    pub fn from_names<S: AsRef<str>>(names: &[S], options: PassOptions) -> Result<Self, PassError> {
        let mut manager = Self::new(options);
        for name in names {
            let name = name.as_ref();
            let entry = REGISTRY
                .iter()
                .find(|entry| entry.name == name)
                .ok_or_else(|| PassError::UnknownPass {
                    name: name.to_owned(),
                })?;
            manager.passes.push((entry.create)());
        }
        Ok(manager)
    }

    pub fn add<P: Pass + 'static>(&mut self, pass: P) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn options(&self) -> &PassOptions {
        &self.options
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass over `asr`.
    ///
    /// # Panics
    ///
    /// With `verify` set, a pass that leaves a malformed tree is an internal
    /// compiler error.
    pub fn run(&mut self, asr: &mut Asr) {
        for pass in &mut self.passes {
            let name = pass.name();
            debug!(pass = name, "running pass");
            pass.run(asr, &self.options);
            if self.options.verify {
                verify_after(name, asr);
            }
        }
    }
}

pub(crate) fn verify_after(pass: &str, asr: &Asr) {
    if let Err(err) = fern_asr::verify(asr) {
        ice!("ASR is malformed after `{pass}`: {err}");
    }
}
