/// Mock devices, host and renderer for unit tests (no GPU required)
///
/// Every mock device records create/destroy calls into a shared `EventLog`,
/// so tests can check leak freedom and teardown order across backends.

pub mod mock_device;
pub mod mock_host;

pub use mock_device::*;
pub use mock_host::*;
pub use mock_renderer::*;
