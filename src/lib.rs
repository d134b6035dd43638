//! Function-level static dependence and omissibility analysis over a typed,
//! SSA-form IR.
//!
//! Given one function's IR, this crate determines which load/store
//! instructions are *omittable* — safe for a host to elide without changing
//! observable behavior — by building a store/load control-flow graph
//! (`slcfg`), walking it backward against a host-supplied dependence oracle
//! (`walker`, `oracle`) to build a program dependence graph (`pdg`), and
//! refining the result against post-dominance (`postdom`, `omit`).
//!
//! The host owns the IR, the dependence oracle, post-dominance, and (when
//! available) call-graph and loop-info: this crate is a pure, `Send + Sync`
//! analysis pass over data the host supplies, never a compiler of its own.
//! See [`analyzer::analyze`] for the entry point.

pub mod analyzer;
pub mod counters;
pub mod emit;
pub mod error;
pub mod graph;
pub mod ir;
pub mod locality;
pub mod naming;
pub mod omit;
pub mod oracle;
pub mod pdg;
pub mod postdom;
pub mod slcfg;
pub mod walker;

#[cfg(feature = "cli")]
pub mod cli;

/// Test-only logging setup so a failing test's `tracing` spans are visible
/// under `cargo test -- --nocapture`.
#[cfg(test)]
pub(crate) mod test_support {
    pub fn init_tracing() {
        let _: Result<_, _> = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
