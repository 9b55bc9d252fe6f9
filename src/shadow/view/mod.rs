mod host;
mod kernel;

pub use host::HostView;
pub use kernel::KernelView;
