//! A `no_std`, no-alloc shadow method-register engine for GPU command channels.
//!
//! Test drivers and script interpreters address hardware fields by name. The
//! engine keeps a host-side shadow of every method register, folds field writes
//! into whole-register values, and later flushes each dirty register to the
//! channel exactly once, followed by a configurable wait-for-idle barrier.
//!
//! # Features
//!
//! - **Zero heap allocation** - Capacities are const generics
//! - **Bitfield-addressable fields** - `[high:low]` ranges with optional symbolic values
//! - **Write coalescing** - One channel write per dirty register, in last-touched order
//! - **Five idle barriers** - Poll, sleep, host-assisted, notifier and interrupt+notifier
//! - **Scoped resources** - Notifier blocks and wait events are released on drop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────────────┐
//! │   Host (script)  │         │   Kernel (flush)         │
//! │                  │         │                          │
//! │  write_field()   │────────▶│  flush(channel)          │──▶ MethodChannel
//! │  write_symbol()  │  dirty  │  (one write per method)  │
//! │  (marks dirty)   │  order  │                          │
//! │  read_field()    │◀────────│  shadow kept after flush │
//! └──────────────────┘         └──────────────────────────┘
//!                                          │
//!                                          ▼
//!                                   IdleBarrier::wait
//! ```
//!
//! Re-writing a register that is already dirty moves it to the tail of the
//! flush order, so hardware sees registers in the order they were last touched.
//!
//! # Example
//!
//! ```rust,no_run
//! use method_shadow::prelude::*;
//! use method_shadow::shadow::ChannelCode;
//!
//! struct Channel;
//!
//! impl MethodChannel for Channel {
//!     fn write_method(&mut self, _address: u32, _value: u32) -> bool {
//!         true
//!     }
//!     fn query_idle(&mut self) -> bool {
//!         true
//!     }
//!     fn block_until_idle(&mut self) -> Result<(), ChannelCode> {
//!         Ok(())
//!     }
//! }
//!
//! struct Clock(u64);
//!
//! impl TimeSource for Clock {
//!     fn now_us(&mut self) -> u64 {
//!         self.0
//!     }
//!     fn delay_us(&mut self, us: u32) {
//!         self.0 += us as u64;
//!     }
//! }
//!
//! const ROPS: &[Enumerant] = &[Enumerant::new("SRCCOPY", 0xCC), Enumerant::new("BLACK", 0x00)];
//!
//! let storage = MethodStorageBuilder::new()
//!     .register_capacity::<64>()
//!     .field_capacity::<16>()
//!     .reject_redeclare()
//!     .field("Rop", Method::new(0x2A0).bits(7, 0).enumerants(ROPS))?
//!     .field("DstWidth", Method::new(0x2B0).bits(15, 0))?
//!     .field("DstHeight", Method::new(0x2B0).bits(31, 16))?
//!     .build();
//!
//! let mut engine = MethodEngine::new(
//!     &storage,
//!     Channel,
//!     Clock(0),
//!     SimpleBarrier::poll(PollConfig::default()),
//! );
//!
//! // Script side: two fields of 0x2B0 coalesce into one write
//! engine.host_shadow().with_view(|view| {
//!     view.write_symbol("Rop", "SRCCOPY")?;
//!     view.write_field("DstWidth", 640)?;
//!     view.write_field("DstHeight", 480)
//! })?;
//!
//! // Two registers reach the channel, then the barrier polls for idle
//! assert_eq!(engine.launch()?, 2);
//! # Ok::<(), ShadowError>(())
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod shadow;

pub mod prelude {
    pub use crate::shadow::prelude::*;
}
