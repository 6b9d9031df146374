use procsim_core::config::SimConfig;
use procsim_core::pipeline::{Simulator, StageCycles};
use procsim_core::stats::SimStats;
use procsim_core::trace::{DecodedInst, TraceSource};

/// Builds a decoded instruction; a negative register index means "none".
/// Addresses only matter for logging, so each call uses a fixed one.
pub fn inst(op_class: i32, src1: i32, src2: i32, dest: i32) -> DecodedInst {
    DecodedInst {
        address: 0x0040_0000,
        op_class,
        src_regs: [src1, src2],
        dest_reg: dest,
    }
}

pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    /// Runs `trace` through a fresh simulator dimensioned by
    /// (result buses, FU counts, fetch rate) and returns the drained state.
    pub fn run(
        result_buses: usize,
        fu_counts: [usize; 3],
        fetch_rate: usize,
        trace: Vec<DecodedInst>,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = SimConfig {
            result_buses,
            fu_counts,
            fetch_rate,
            trace_stages: false,
        };
        let mut sim = Simulator::new(&config);
        let mut source = TraceSource::new(trace);
        sim.run(&mut source);
        Self { sim }
    }

    /// Stage cycles of the instruction with the given tag.
    pub fn log(&self, tag: usize) -> StageCycles {
        self.sim.cycle_log()[tag]
    }

    /// Aggregate counters for the run.
    pub fn stats(&self) -> &SimStats {
        self.sim.stats()
    }
}
