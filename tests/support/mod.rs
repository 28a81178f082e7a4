// Not every test binary uses every helper.
#![allow(dead_code, unused_imports)]

pub mod stub_backend;

pub use stub_backend::StubBackend;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Poll `cond` every 10ms until it holds or two seconds elapse.
pub async fn wait_for<F: FnMut() -> bool>(what: &str, mut cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}
