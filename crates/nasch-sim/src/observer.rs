//! Observer trait for progress reporting.

use nasch_core::Road;

/// Callbacks invoked by the runners at step boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  In lockstep runs the hooks execute on
/// the merging unit's thread, hence the `Send` bound there.
///
/// # Example — flow printer
///
/// ```rust,ignore
/// struct FlowPrinter { interval: u64 }
///
/// impl SimObserver for FlowPrinter {
///     fn on_step_end(&mut self, step: u64, road: &Road) {
///         if step % self.interval == 0 {
///             println!("step {step}: mean v = {:?}", road.mean_velocity());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after the road for `step + 1` has been committed.
    fn on_step_end(&mut self, _step: u64, _road: &Road) {}

    /// Called once after the final step completes.
    fn on_sim_end(&mut self, _steps: u64, _road: &Road) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
