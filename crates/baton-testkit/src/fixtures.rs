//! Ready-made engines, backends and tracing setup

use std::sync::Once;

use baton_store::MemoryMedium;
use tracing_subscriber::EnvFilter;

use crate::container::MemoryContainer;
use crate::navigator::MemoryNavigator;

/// Storefront-style route table starting on `/home`:
/// `home`, `cart`, `checkout`, `pay`, `login`, `done`, `users`, `user` (`/users/:id`)
pub fn shop_navigator() -> MemoryNavigator {
    MemoryNavigator::new("/home")
        .route("home", "/home")
        .route("cart", "/cart")
        .route("checkout", "/checkout")
        .route("pay", "/pay")
        .route("login", "/login")
        .route("done", "/done")
        .route("users", "/users")
        .route("user", "/users/:id")
}

/// Medium and container pair for exercising both backends
#[derive(Debug, Clone, Default)]
pub struct Backends {
    /// Medium for the local backend
    pub medium: MemoryMedium,
    /// Container for the external backend
    pub container: MemoryContainer,
}

impl Backends {
    /// Fresh, empty backends
    pub fn new() -> Self {
        Self::default()
    }
}

static TRACING: Once = Once::new();

/// Install a test subscriber once; filter with `RUST_LOG`, default is debug for the baton crates
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("baton_core=debug,baton_store=debug,baton_router=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
