//! Instruction-source behavior: trace files on disk and the fetch stage's
//! contract with the source (rate-limited reads, no reads past end of
//! stream).

use std::io::Write;

use mockall::Sequence;

use crate::common::harness::inst;
use crate::common::mocks::MockSource;
use procsim_core::config::SimConfig;
use procsim_core::pipeline::Simulator;
use procsim_core::trace::{parse_trace, DecodedInst};

#[test]
fn parses_a_trace_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "7b034dd0 2 1 2 3").unwrap();
    writeln!(file, "0x7b034dd4 -1 4 1 -1").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "7b034dd8 0 -1 -1 -1").unwrap();
    file.flush().unwrap();

    let reader = std::io::BufReader::new(std::fs::File::open(file.path()).unwrap());
    let insts = parse_trace(reader).unwrap();
    assert_eq!(insts.len(), 3);
    assert_eq!(
        insts[0],
        DecodedInst {
            address: 0x7b03_4dd0,
            op_class: 2,
            src_regs: [2, 3],
            dest_reg: 1,
        }
    );
    assert_eq!(insts[1].op_class, -1);
    assert_eq!(insts[2].dest_reg, -1);
}

#[test]
fn fetch_respects_the_fetch_rate_and_never_reads_past_eof() {
    let mut source = MockSource::new();
    let mut seq = Sequence::new();
    for i in 0..3 {
        source
            .expect_read_instruction()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Some(inst(0, -1, -1, i)));
    }
    // Fourth read hits end of stream; the fetch stage must not ask again,
    // and the mock verifies exactly four calls happen in total.
    source
        .expect_read_instruction()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(None);

    let config = SimConfig {
        result_buses: 4,
        fu_counts: [3, 0, 0],
        fetch_rate: 2,
        trace_stages: false,
    };
    let mut sim = Simulator::new(&config);
    sim.run(&mut source);

    // Two instructions land in cycle 1, the third in cycle 2.
    assert_eq!(sim.cycle_log()[0].fetch, 1);
    assert_eq!(sim.cycle_log()[1].fetch, 1);
    assert_eq!(sim.cycle_log()[2].fetch, 2);
    assert_eq!(sim.stats().instructions_retired, 3);
}
