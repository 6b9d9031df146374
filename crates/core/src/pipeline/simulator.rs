//! Pipeline driver: per-cycle two-phase orchestration of all stages.
//!
//! Each simulated cycle runs every stage twice, first-half then second-half,
//! in reverse pipeline order (state update, execute, schedule, dispatch,
//! fetch). The reverse order makes every producer overwrite a resource only
//! after its previous-cycle consumer has read it; the half split lets a stage
//! separate observe/reserve work from mutate/forward work. The net effect is
//! that an instruction advances at most one stage per cycle and work created
//! in cycle N becomes visible upstream in cycle N+1.
//!
//! Who mutates what: fetch owns the dispatch queue and the tag counter;
//! dispatch owns slot reservation, reservation-station creation, and the
//! register status table's producer entries; schedule owns firing and source
//! wakeup; execute owns the scoreboard drain, the result-bus pool, and the
//! ready flips of the register status table; state update owns retirement.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Write};

use crate::config::{SimConfig, NUM_FU_TYPES};
use crate::pipeline::cdb::CdbPool;
use crate::pipeline::regfile::RegisterStatus;
use crate::pipeline::scoreboard::Scoreboard;
use crate::pipeline::station::{ReservationStation, Status, Tag};
use crate::stats::SimStats;
use crate::trace::{DecodedInst, InstructionSource};

/// Which half of the simulated cycle a stage pass is running in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Half {
    First,
    Second,
}

/// Cycles at which one instruction passed each stage. Zero means the stage
/// has not been reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageCycles {
    /// Cycle the instruction was drawn from the source.
    pub fetch: u64,
    /// Cycle its reservation station entered the scheduling queue.
    pub dispatch: u64,
    /// Cycle it fired (was granted a functional-unit slot).
    pub schedule: u64,
    /// Cycle its functional unit processed it; always fire + 1.
    pub execute: u64,
    /// Cycle it retired from the scheduling queue.
    pub state_update: u64,
}

/// A fetched instruction waiting in the dispatch queue.
#[derive(Clone, Copy, Debug)]
struct FetchedInst {
    inst: DecodedInst,
    tag: Tag,
}

/// An executed instruction waiting for a result bus.
#[derive(Clone, Copy, Debug)]
struct PendingBroadcast {
    fu_type: usize,
    tag: Tag,
}

/// The pipeline simulator: owns every structure the stages share, so each
/// stage method has exclusive access for the duration of its pass.
pub struct Simulator {
    /// Reservation stations keyed by tag; key order is program order and the
    /// priority order for every contested resource.
    scheduling_queue: BTreeMap<Tag, ReservationStation>,
    /// Fetched instructions awaiting a scheduling-queue slot.
    dispatch_queue: VecDeque<FetchedInst>,
    /// Executed instructions awaiting a result bus, oldest batch first.
    waiting: VecDeque<PendingBroadcast>,
    cdb: CdbPool,
    scoreboard: Scoreboard,
    regfile: RegisterStatus,
    /// Per-instruction stage cycles, indexed by tag.
    cycle_log: Vec<StageCycles>,

    scheduling_queue_capacity: usize,
    fetch_rate: usize,
    /// Scheduling-queue slots claimed by dispatch in the first half, consumed
    /// in the second.
    reserved_slots: usize,
    next_tag: u32,
    done_fetching: bool,
    trace_stages: bool,
    stats: SimStats,
}

impl Simulator {
    /// Creates a simulator dimensioned by `config`, with every register
    /// ready, every functional unit free, and every result bus idle.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            scheduling_queue: BTreeMap::new(),
            dispatch_queue: VecDeque::new(),
            waiting: VecDeque::new(),
            cdb: CdbPool::new(config.result_buses),
            scoreboard: Scoreboard::new(config.fu_counts),
            regfile: RegisterStatus::new(),
            cycle_log: Vec::new(),
            scheduling_queue_capacity: config.scheduling_queue_capacity(),
            fetch_rate: config.fetch_rate,
            reserved_slots: 0,
            next_tag: 0,
            done_fetching: false,
            trace_stages: config.trace_stages,
            stats: SimStats::default(),
        }
    }

    /// Runs the pipeline until the source is exhausted and the scheduling
    /// queue has drained. Every instruction read from the source will have
    /// been fetched, dispatched, scheduled, executed, and state-updated.
    pub fn run(&mut self, source: &mut dyn InstructionSource) {
        if self.trace_stages {
            eprintln!("CYCLE\tOPERATION\tINSTRUCTION");
        }
        while !self.done() {
            self.stats.cycles += 1;
            for half in [Half::First, Half::Second] {
                self.state_update(half);
                self.execute(half);
                self.schedule(half);
                self.dispatch(half);
                self.fetch(half, source);
            }
        }
    }

    /// Aggregate counters for the run so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Per-instruction stage cycles, indexed by tag.
    pub fn cycle_log(&self) -> &[StageCycles] {
        &self.cycle_log
    }

    /// Writes the per-instruction cycle table: a header row, one tab-separated
    /// row per instruction in tag order (printed 1-based), and a trailing
    /// blank line.
    pub fn write_instruction_cycles<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "INST\tFETCH\tDISP\tSCHED\tEXEC\tSTATE")?;
        for (index, log) in self.cycle_log.iter().enumerate() {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                index + 1,
                log.fetch,
                log.dispatch,
                log.schedule,
                log.execute,
                log.state_update
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn done(&self) -> bool {
        self.done_fetching && self.scheduling_queue.is_empty()
    }

    fn cycle(&self) -> u64 {
        self.stats.cycles
    }

    /// Fetch stage: second half only. Draws up to `fetch_rate` instructions,
    /// assigns each the next tag, records its fetch cycle (and the promise
    /// that it dispatches next cycle), and appends it to the dispatch queue.
    /// Samples the dispatch-queue length once per cycle for the occupancy
    /// statistics, whether or not anything was fetched.
    fn fetch(&mut self, half: Half, source: &mut dyn InstructionSource) {
        if half == Half::First {
            return;
        }
        let cycle = self.cycle();

        if !self.done_fetching {
            for _ in 0..self.fetch_rate {
                match source.read_instruction() {
                    Some(inst) => {
                        let tag = Tag(self.next_tag);
                        self.next_tag += 1;
                        self.cycle_log.push(StageCycles {
                            fetch: cycle,
                            dispatch: cycle + 1,
                            ..StageCycles::default()
                        });
                        self.dispatch_queue.push_back(FetchedInst { inst, tag });
                        log_stage(self.trace_stages, cycle, "FETCHED", tag);
                    }
                    None => {
                        self.done_fetching = true;
                        break;
                    }
                }
            }
        }

        self.stats.disp_queue_accum += self.dispatch_queue.len() as u64;
        self.stats.max_disp_queue = self.stats.max_disp_queue.max(self.dispatch_queue.len() as u64);
    }

    /// Dispatch stage. First half: reserve scheduling-queue slots. The count
    /// is fixed here, before state update frees any slot in the following
    /// cycle, so dispatch never sees a slot being vacated in the same cycle.
    /// Second half: pop that many instructions off the dispatch queue and
    /// build their reservation stations, capturing source producers from the
    /// register status table and claiming it for the destination.
    fn dispatch(&mut self, half: Half) {
        let cycle = self.cycle();
        match half {
            Half::First => {
                self.reserved_slots = (self.scheduling_queue_capacity
                    - self.scheduling_queue.len())
                .min(self.dispatch_queue.len());
            }
            Half::Second => {
                while self.reserved_slots > 0 {
                    let fetched = match self.dispatch_queue.pop_front() {
                        Some(fetched) => fetched,
                        None => break,
                    };
                    self.reserved_slots -= 1;

                    let inst = fetched.inst;
                    let mut src_pending = [None; 2];
                    for (slot, &reg) in src_pending.iter_mut().zip(inst.src_regs.iter()) {
                        if reg >= 0 {
                            *slot = self.regfile.producer(reg as usize);
                        }
                    }
                    if inst.dest_reg >= 0 {
                        self.regfile.set_producer(inst.dest_reg as usize, fetched.tag);
                    }

                    self.scheduling_queue.insert(
                        fetched.tag,
                        ReservationStation {
                            op_class: inst.op_class,
                            src_pending,
                            dest_reg: inst.dest_reg,
                            tag: fetched.tag,
                            status: Status::Dispatched,
                            stamp: cycle,
                        },
                    );
                    self.cycle_log[fetched.tag.0 as usize].dispatch = cycle;
                    log_stage(self.trace_stages, cycle, "DISPATCHED", fetched.tag);
                }
            }
        }
    }

    /// Schedule stage, in tag order so lower tags win contested units.
    ///
    /// Both halves wake pending sources from the busy result buses. The first
    /// half does so before the firing decision, which is what lets a consumer
    /// fire in the same cycle its producer broadcasts (execute has already run
    /// this half). The second-half pass catches entries that could not fire
    /// this cycle: the descriptors are recycled by the next broadcast pass,
    /// so readiness must be captured before then.
    ///
    /// Firing (first half only): an entry with both sources ready claims the
    /// first free slot of its unit type, becomes SCHEDULED, and logs this
    /// cycle as its fire cycle and the next as its execute cycle. Entries
    /// dispatched this very cycle are skipped; they wait one cycle.
    fn schedule(&mut self, half: Half) {
        let cycle = self.cycle();
        for (&tag, rs) in self.scheduling_queue.iter_mut() {
            if rs.status != Status::Dispatched || rs.stamp == cycle {
                continue;
            }

            for broadcast in self.cdb.broadcasts() {
                rs.forward(broadcast.tag);
            }
            if half == Half::Second || !rs.ready() {
                continue;
            }

            if self.scoreboard.try_assign(rs.fu_type(), tag) {
                rs.status = Status::Scheduled;
                rs.stamp = cycle;
                self.cycle_log[tag.0 as usize].schedule = cycle;
                self.cycle_log[tag.0 as usize].execute = cycle + 1;
                self.stats.instructions_fired += 1;
                log_stage(self.trace_stages, cycle, "SCHEDULED", tag);
            }
        }
    }

    /// Execute stage: first half only. Two sub-steps:
    ///
    /// 1. Every SCHEDULED scoreboard occupant becomes EXECUTED and joins the
    ///    waiting-to-broadcast list. The per-cycle batch is sorted by tag so
    ///    the list hands out result buses oldest-first.
    /// 2. The broadcast pass clears the bus pool and pairs buses with waiting
    ///    instructions in order. An instruction with a destination publishes
    ///    (tag, register) and flips the register ready if it is still that
    ///    register's named producer; one without a destination consumes its
    ///    bus slot without publishing. Either way the functional unit is
    ///    released and the entry becomes COMPLETED. Leftover waiting entries
    ///    carry over to the next cycle.
    fn execute(&mut self, half: Half) {
        if half == Half::Second {
            return;
        }
        let cycle = self.cycle();

        let mut executed: Vec<PendingBroadcast> = Vec::new();
        for fu_type in 0..NUM_FU_TYPES {
            for tag in self.scoreboard.occupants(fu_type) {
                let rs = match self.scheduling_queue.get_mut(&tag) {
                    Some(rs) => rs,
                    None => continue,
                };
                if rs.status == Status::Scheduled {
                    rs.status = Status::Executed;
                    rs.stamp = cycle;
                    executed.push(PendingBroadcast { fu_type, tag });
                    log_stage(self.trace_stages, cycle, "EXECUTED", tag);
                }
            }
        }
        executed.sort_by_key(|pending| pending.tag);
        self.waiting.extend(executed);

        self.cdb.clear();
        for bus_index in 0..self.cdb.capacity() {
            let pending = match self.waiting.pop_front() {
                Some(pending) => pending,
                None => break,
            };
            let rs = match self.scheduling_queue.get_mut(&pending.tag) {
                Some(rs) => rs,
                None => continue,
            };

            if rs.dest_reg >= 0 {
                self.cdb.publish(bus_index, pending.tag, rs.dest_reg);
                self.regfile.clear_if_match(rs.dest_reg as usize, pending.tag);
            }
            self.scoreboard.release(pending.fu_type, pending.tag);
            rs.status = Status::Completed;
            rs.stamp = cycle;
        }
    }

    /// State-update stage: second half only. Removes, in tag order, every
    /// COMPLETED entry whose stamp is strictly older than this cycle. Entries
    /// that completed this cycle stay one more cycle so their broadcast is
    /// observable by schedule's forwarding in the next cycle.
    fn state_update(&mut self, half: Half) {
        if half == Half::First {
            return;
        }
        let cycle = self.cycle();
        let cycle_log = &mut self.cycle_log;
        let stats = &mut self.stats;
        let trace_stages = self.trace_stages;
        self.scheduling_queue.retain(|&tag, rs| {
            if rs.status == Status::Completed && rs.stamp < cycle {
                cycle_log[tag.0 as usize].state_update = cycle;
                stats.instructions_retired += 1;
                log_stage(trace_stages, cycle, "STATE UPDATE", tag);
                false
            } else {
                true
            }
        });
    }
}

/// One diagnostic line per stage transition, tag printed 1-based.
fn log_stage(enabled: bool, cycle: u64, stage: &str, tag: Tag) {
    if enabled {
        eprintln!("{}\t{}\t{}", cycle, stage, tag.0 + 1);
    }
}
