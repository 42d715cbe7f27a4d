/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been reclaimed or never existed. Check PID validity.")
    )]
    NotFound(Pid),

    #[error("Process table full: {capacity} slots in use")]
    #[diagnostic(
        code(process::table_full),
        help("Reap terminated children or raise KERNEL_NPROC.")
    )]
    TableFull { capacity: usize },

    #[error("Address space clone failed: {0}")]
    #[diagnostic(
        code(process::memory_clone_failed),
        help("The memory manager could not duplicate the parent image.")
    )]
    MemoryCloneFailed(String),

    #[error("Could not allocate execution context: {0}")]
    #[diagnostic(
        code(process::context_unavailable),
        help("The host refused to create the process context thread.")
    )]
    ContextUnavailable(String),

    #[error("Process {0} has no children")]
    #[diagnostic(code(process::no_children))]
    NoChildren(Pid),

    #[error("Process {0} was killed")]
    #[diagnostic(code(process::killed))]
    Killed(Pid),

    #[error("Invalid ticket count: {0}")]
    #[diagnostic(
        code(process::invalid_tickets),
        help("Ticket counts must be strictly positive.")
    )]
    InvalidTickets(i64),
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Invalid scheduling policy: {0}")]
    #[diagnostic(
        code(scheduler::invalid_policy),
        help("Use round_robin, fifo, or lottery.")
    )]
    InvalidPolicy(String),
}

/// Address-space collaborator errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Out of memory: {live} address spaces live, limit {limit}")]
    #[diagnostic(code(memory::out_of_memory))]
    OutOfMemory { live: usize, limit: usize },

    #[error("No address space for process {0}")]
    #[diagnostic(code(memory::no_address_space))]
    NoAddressSpace(Pid),
}

impl From<MemoryError> for ProcessError {
    fn from(err: MemoryError) -> Self {
        ProcessError::MemoryCloneFailed(err.to_string())
    }
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Memory error: {0}")]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Configuration(String),

    #[error("Kernel halted: {0}")]
    #[diagnostic(
        code(kernel::halted),
        help("A fatal invariant violation stopped an execution core.")
    )]
    Halted(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(kernel::io_error))]
    Io(String),
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::Io(err.to_string())
    }
}
