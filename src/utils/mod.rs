pub mod command;
pub mod docker;
pub mod files;
pub mod locker;
pub mod restic;
pub mod shell;

// Trait-based abstractions for testability
pub mod docker_ops;
pub mod executor;
pub mod files_ops;
pub mod restic_ops;

// Re-export commonly used types and traits (used by test crate)
pub use docker_ops::{ContainerOperations, DockerContainerOps};
pub use executor::{CommandExecutor, RealExecutor};
pub use files_ops::{FileOperations, RealFileOps};
pub use restic_ops::{RealResticOps, ResticOperations};
