//! Universal pipeline invariants over a mixed workload.
//!
//! A deterministic trace mixing all op classes, RAW chains, and
//! destination-less instructions, checked against the properties that must
//! hold for every run: stage-cycle ordering per instruction, program-order
//! retirement, per-cycle fire and retire bounds, and counter identities.

use std::collections::HashMap;

use crate::common::harness::{inst, TestContext};
use procsim_core::trace::DecodedInst;

const RESULT_BUSES: usize = 2;
const FU_COUNTS: [usize; 3] = [1, 2, 1];
const FETCH_RATE: usize = 3;
const TRACE_LEN: usize = 16;

/// Sixteen instructions cycling through the op classes, where instruction i
/// reads the register written by instruction i-2 and two instructions write
/// nothing at all.
fn mixed_trace() -> Vec<DecodedInst> {
    (0..TRACE_LEN as i32)
        .map(|i| {
            let op = [0, 1, 2, -1][(i % 4) as usize];
            let src1 = i - 2;
            let dest = if i == 5 || i == 11 { -1 } else { i };
            inst(op, src1, -1, dest)
        })
        .collect()
}

fn fu_type(op_class: i32) -> usize {
    if op_class < 0 {
        1
    } else {
        op_class as usize
    }
}

#[test]
fn every_instruction_is_fetched_and_retired_exactly_once() {
    let ctx = TestContext::run(RESULT_BUSES, FU_COUNTS, FETCH_RATE, mixed_trace());
    assert_eq!(ctx.sim.cycle_log().len(), TRACE_LEN);
    assert_eq!(ctx.stats().instructions_retired, TRACE_LEN as u64);
    assert_eq!(ctx.stats().instructions_fired, TRACE_LEN as u64);
}

#[test]
fn stage_cycles_are_ordered_within_each_instruction() {
    let ctx = TestContext::run(RESULT_BUSES, FU_COUNTS, FETCH_RATE, mixed_trace());
    for tag in 0..TRACE_LEN {
        let log = ctx.log(tag);
        assert!(log.fetch >= 1, "tag {} never fetched", tag);
        assert!(log.dispatch > log.fetch, "tag {} dispatch order", tag);
        assert!(log.schedule > log.dispatch, "tag {} schedule order", tag);
        assert_eq!(log.execute, log.schedule + 1, "tag {} executes after fire", tag);
        assert!(log.state_update > log.execute, "tag {} retire order", tag);
    }
}

#[test]
fn retirement_follows_fetch_order() {
    let ctx = TestContext::run(RESULT_BUSES, FU_COUNTS, FETCH_RATE, mixed_trace());
    for tag in 1..TRACE_LEN {
        assert!(ctx.log(tag).fetch >= ctx.log(tag - 1).fetch);
        assert!(ctx.log(tag).state_update >= ctx.log(tag - 1).state_update);
    }
}

#[test]
fn per_cycle_fire_and_retire_bounds_hold() {
    let trace = mixed_trace();
    let ctx = TestContext::run(RESULT_BUSES, FU_COUNTS, FETCH_RATE, trace.clone());

    let mut fires_per_unit: HashMap<(u64, usize), usize> = HashMap::new();
    let mut retires_per_cycle: HashMap<u64, usize> = HashMap::new();
    for tag in 0..TRACE_LEN {
        let log = ctx.log(tag);
        *fires_per_unit
            .entry((log.schedule, fu_type(trace[tag].op_class)))
            .or_default() += 1;
        *retires_per_cycle.entry(log.state_update).or_default() += 1;
    }

    for (&(cycle, unit), &count) in &fires_per_unit {
        assert!(
            count <= FU_COUNTS[unit],
            "cycle {}: {} fires on {} type-{} units",
            cycle,
            count,
            FU_COUNTS[unit],
            unit
        );
    }
    for (&cycle, &count) in &retires_per_cycle {
        assert!(
            count <= RESULT_BUSES,
            "cycle {}: {} retirements with {} result buses",
            cycle,
            count,
            RESULT_BUSES
        );
    }
}

#[test]
fn average_counters_are_consistent() {
    let ctx = TestContext::run(RESULT_BUSES, FU_COUNTS, FETCH_RATE, mixed_trace());
    let stats = ctx.stats();
    let cycles = stats.cycles as f64;
    assert!((stats.avg_inst_retired() * cycles - stats.instructions_retired as f64).abs() < 1e-9);
    assert!((stats.avg_inst_fired() * cycles - stats.instructions_fired as f64).abs() < 1e-9);
    assert!((stats.avg_disp_queue() * cycles - stats.disp_queue_accum as f64).abs() < 1e-9);
    assert!(stats.max_disp_queue as f64 >= stats.avg_disp_queue());
}
