#[allow(unused_imports)]
pub use taskdag_test_utils::builders;
#[allow(unused_imports)]
pub use taskdag_test_utils::probe::ConcurrencyProbe;
pub use taskdag_test_utils::init_tracing;
#[allow(unused_imports)]
pub use taskdag_test_utils::with_timeout;
