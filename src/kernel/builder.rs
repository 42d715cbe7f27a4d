/*!
 * Kernel Builder
 * Wires configuration and collaborators into a kernel instance
 */

use super::Kernel;
use crate::core::config::KernelConfig;
use crate::core::types::KernelResult;
use crate::process::resources::{AddressSpaces, DescriptorTable, SimulatedFiles, SimulatedMemory};
use log::info;
use std::sync::Arc;

/// Builder for Kernel
#[derive(Default)]
pub struct KernelBuilder {
    config: Option<KernelConfig>,
    memory: Option<Arc<dyn AddressSpaces>>,
    files: Option<Arc<dyn DescriptorTable>>,
}

impl KernelBuilder {
    /// Create a new Kernel builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of the defaults
    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Address-space collaborator (simulated if unset)
    pub fn with_memory(mut self, memory: Arc<dyn AddressSpaces>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Descriptor collaborator (simulated if unset)
    pub fn with_files(mut self, files: Arc<dyn DescriptorTable>) -> Self {
        self.files = Some(files);
        self
    }

    /// Validate the configuration and build the kernel
    pub fn build(self) -> KernelResult<Arc<Kernel>> {
        let config = self.config.unwrap_or_default();
        let memory = self
            .memory
            .unwrap_or_else(|| Arc::new(SimulatedMemory::new()));
        let files = self.files.unwrap_or_else(|| Arc::new(SimulatedFiles::new()));

        let kernel = Kernel::from_parts(config, memory, files)?;
        info!(
            "kernel built: policy={}, cpus={}, nproc={}, clock={:?}",
            kernel.config().policy,
            kernel.config().cpus,
            kernel.config().capacity,
            kernel.config().clock
        );
        Ok(Arc::new(kernel))
    }
}
