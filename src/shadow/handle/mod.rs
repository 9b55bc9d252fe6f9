mod host;
mod kernel;

pub use host::HostShadow;
pub use kernel::KernelShadow;
