// Library exports for integration tests and reusable components

#[doc(hidden)]
pub mod config;

pub mod models;
pub mod playback;
pub mod player_sync;
pub mod room_client;
pub mod session;

// Test support (only available with test-utils feature)
#[cfg(feature = "test-utils")]
pub mod test_support;
