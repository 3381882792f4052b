/// Registry of reclaim hooks.
///
/// Embedding applications register callbacks that drop cached file
/// handles, memory maps and similar resources. A platform that needs the
/// reclaim workaround runs every hook before the single retry of a failed
/// delete. Cloning shares the registry.
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct ReclaimHooks {
    hooks: Arc<RwLock<Vec<Hook>>>,
}

impl ReclaimHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook. Hooks run in registration order.
    pub fn register<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.write().push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    pub fn run_all(&self) {
        let hooks = self.hooks.read();
        debug!("Running {} reclaim hook(s)", hooks.len());
        for hook in hooks.iter() {
            hook();
        }
    }
}

impl std::fmt::Debug for ReclaimHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReclaimHooks")
            .field("len", &self.len())
            .finish()
    }
}
