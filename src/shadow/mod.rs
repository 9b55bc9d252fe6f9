pub mod barrier;
pub mod builder;
pub mod catalog;
pub mod channel;
pub mod engine;
pub mod error;
pub mod handle;
pub mod helpers;
pub mod method;
pub mod policy;
pub mod resource;
pub mod storage;
pub(crate) mod table;
pub mod view;

#[cfg(test)]
mod test_support;

pub use barrier::{
    IdleBarrier, InterruptConfig, NotifierConfig, NotifierMethods, NotifierWait, PollConfig,
    SimpleBarrier, SleepConfig,
};
pub use builder::MethodStorageBuilder;
pub use catalog::{Declared, MethodCatalog};
#[cfg(feature = "std")]
pub use channel::StdTimeSource;
pub use channel::{
    ChannelCode, EventWaitError, MethodChannel, NoEvents, NoNotifier, NotifierMemory, TimeSource,
    WaitEvents,
};
pub use engine::{FlushStats, MethodEngine};
pub use error::ShadowError;
pub use handle::{HostShadow, KernelShadow};
pub use method::{Enumerant, FieldSpan, Method};
pub use policy::{DeclarePolicy, OverridePolicy, RejectPolicy};
pub use resource::{NOTIFIER_BYTES, ScopedEvent, ScopedNotifier};
pub use storage::{MethodStorage, WriteFn};
pub use view::{HostView, KernelView};

pub mod prelude {
    pub use super::{
        DeclarePolicy, Enumerant, HostShadow, HostView, IdleBarrier, InterruptConfig,
        KernelShadow, KernelView, Method, MethodChannel, MethodEngine, MethodStorage,
        MethodStorageBuilder, NoEvents, NoNotifier, NotifierConfig, NotifierMemory,
        NotifierMethods, PollConfig, ShadowError, SimpleBarrier, SleepConfig, TimeSource,
        WaitEvents,
    };
}
