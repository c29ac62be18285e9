//! High-level runtime engine settings
//!
//! Selects the force model, whether collisions are resolved, and whether
//! the O(N^2) kernels run on the rayon thread pool

use crate::configuration::config::ForceConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub force: ForceConfig, // gravity, null or noise
    pub collisions: bool, // false = skip the collision pass entirely
    pub parallel: bool, // false = single-threaded kernels
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            force: ForceConfig::Gravity,
            collisions: true,
            parallel: true,
        }
    }
}
