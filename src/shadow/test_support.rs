//! Test support utilities - only compiled in test builds.

use heapless::Vec;

use crate::shadow::{
    ChannelCode, Enumerant, EventWaitError, Method, MethodCatalog, NotifierMemory,
    NotifierMethods, OverridePolicy, TimeSource, WaitEvents,
    channel::MethodChannel,
    storage::MethodStorage,
    table::ShadowTable,
    view::HostView,
};

/// Standard test configuration: 8 registers, 8 fields
pub type TestTable = ShadowTable<4>;
pub type TestStorage = MethodStorage<8, 8>;
pub type TestCatalog = MethodCatalog<8>;

pub const AB: &[Enumerant] = &[Enumerant::new("A", 1), Enumerant::new("B", 2)];

pub const FORMATS: &[Enumerant] = &[
    Enumerant::new("Y8", 0xF3),
    Enumerant::new("A8R8G8B8", 0xCF),
];

/// Field layout shared by the tests:
/// - `X`, `Y`: bits `[7:4]` and `[11:8]` of `0x100`
/// - `Format`: full register `0x204`, symbolic
/// - `Mode`: bits `[1:0]` of `0x208`, symbolic `{A: 1, B: 2}`
/// - `Count`: full register `0x300`, numeric
pub const TEST_FIELDS: &[(&str, Method)] = &[
    ("X", Method::new(0x100).bits(7, 4)),
    ("Y", Method::new(0x100).bits(11, 8)),
    ("Format", Method::new(0x204).enumerants(FORMATS)),
    ("Mode", Method::new(0x208).bits(1, 0).enumerants(AB)),
    ("Count", Method::new(0x300)),
];

pub fn test_catalog() -> TestCatalog {
    let mut catalog = TestCatalog::new();
    let policy = OverridePolicy::default();
    for (name, method) in TEST_FIELDS {
        catalog.declare(*name, *method, &policy).unwrap();
    }
    catalog
}

/// Helper to create a default test storage
pub fn test_storage() -> TestStorage {
    MethodStorage::new(test_catalog())
}

pub fn test_methods() -> NotifierMethods {
    NotifierMethods {
        offset_upper: 0x104,
        offset_lower: 0x108,
        notify: 0x10C,
        notify_value: 0,
    }
}

/// Fixture for HostView tests with the standard field layout.
pub struct TestHostViewFixture {
    pub table: ShadowTable<8>,
    pub catalog: TestCatalog,
}

impl TestHostViewFixture {
    pub fn new() -> Self {
        Self {
            table: ShadowTable::new(),
            catalog: test_catalog(),
        }
    }

    pub fn view(&mut self) -> HostView<'_, 8, 8> {
        HostView::new(&mut self.table, &self.catalog)
    }
}

impl Default for TestHostViewFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Channel that records writes and scripts idle behaviour.
#[derive(Debug)]
pub struct MockChannel {
    pub writes: Vec<(u32, u32), 16>,
    /// Index of the write attempt that is rejected.
    pub fail_at: Option<usize>,
    /// `query_idle` returns true from this query on (1-based); `None` never idles.
    pub idle_on: Option<usize>,
    pub idle_queries: usize,
    pub host_wait: Result<(), ChannelCode>,
    pub host_waits: usize,
    attempts: usize,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            fail_at: None,
            idle_on: Some(1),
            idle_queries: 0,
            host_wait: Ok(()),
            host_waits: 0,
            attempts: 0,
        }
    }

    pub fn idle_after(queries: usize) -> Self {
        Self {
            idle_on: Some(queries),
            ..Self::new()
        }
    }

    pub fn never_idle() -> Self {
        Self {
            idle_on: None,
            ..Self::new()
        }
    }
}

impl MethodChannel for MockChannel {
    fn write_method(&mut self, address: u32, value: u32) -> bool {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return false;
        }
        self.writes.push((address, value)).unwrap();
        true
    }

    fn query_idle(&mut self) -> bool {
        self.idle_queries += 1;
        self.idle_on.is_some_and(|n| self.idle_queries >= n)
    }

    fn block_until_idle(&mut self) -> Result<(), ChannelCode> {
        self.host_waits += 1;
        self.host_wait
    }
}

/// Time source that only advances when delayed.
#[derive(Debug, Default)]
pub struct FakeClock {
    pub now: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { now: 0 }
    }
}

impl TimeSource for FakeClock {
    fn now_us(&mut self) -> u64 {
        self.now
    }

    fn delay_us(&mut self, us: u32) {
        self.now += us as u64;
    }
}

/// One 16-byte notifier block in host memory.
#[derive(Debug)]
pub struct MockNotifier {
    pub bytes: [u8; 16],
    /// Hardware clears the status word on this read (1-based).
    pub complete_after: Option<usize>,
    pub reads: usize,
    pub allocated: usize,
    pub released: usize,
    pub fail_alloc: bool,
}

impl MockNotifier {
    pub const GPU_ADDRESS: u64 = 0x0000_0012_3456_7000;

    pub fn new() -> Self {
        Self {
            bytes: [0; 16],
            complete_after: None,
            reads: 0,
            allocated: 0,
            released: 0,
            fail_alloc: false,
        }
    }
}

impl NotifierMemory for MockNotifier {
    type Block = u8;

    fn allocate(&mut self, size: usize) -> Result<u8, ChannelCode> {
        assert_eq!(size, 16);
        if self.fail_alloc {
            return Err(ChannelCode(7));
        }
        self.allocated += 1;
        Ok(0)
    }

    fn fill(&mut self, _block: &u8, pattern: u8) {
        self.bytes = [pattern; 16];
    }

    fn read(&mut self, _block: &u8, out: &mut [u8]) {
        self.reads += 1;
        if self.complete_after == Some(self.reads) {
            self.bytes[14] = 0;
            self.bytes[15] = 0;
        }
        let n = out.len().min(self.bytes.len());
        out[..n].copy_from_slice(&self.bytes[..n]);
    }

    fn gpu_address(&self, _block: &u8) -> u64 {
        Self::GPU_ADDRESS
    }

    fn release(&mut self, _block: u8) {
        self.released += 1;
    }
}

/// Wait-event source with a scripted result.
#[derive(Debug)]
pub struct MockEvents {
    pub result: Result<(), EventWaitError>,
    pub fail_create: bool,
    pub created: usize,
    pub destroyed: usize,
    pub waits: usize,
    pub last_timeout_ms: u32,
}

impl MockEvents {
    pub fn new() -> Self {
        Self {
            result: Ok(()),
            fail_create: false,
            created: 0,
            destroyed: 0,
            waits: 0,
            last_timeout_ms: 0,
        }
    }
}

impl WaitEvents for MockEvents {
    type Event = ();

    fn create_event(&mut self) -> Result<(), ChannelCode> {
        if self.fail_create {
            return Err(ChannelCode(9));
        }
        self.created += 1;
        Ok(())
    }

    fn block_on_event(&mut self, _event: &(), timeout_ms: u32) -> Result<(), EventWaitError> {
        self.waits += 1;
        self.last_timeout_ms = timeout_ms;
        self.result
    }

    fn destroy_event(&mut self, _event: ()) {
        self.destroyed += 1;
    }
}
