//! Instruction trace input.
//!
//! This module is the boundary between the pipeline engine and whatever
//! produces decoded instructions. It provides:
//! 1. **Records:** `DecodedInst`, the per-instruction fields the engine consumes.
//! 2. **The source seam:** the `InstructionSource` trait the fetch stage pulls from.
//! 3. **Text parsing:** whole-trace validation of the one-line-per-instruction format.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};

use crate::config::NUM_REGISTERS;

/// A decoded instruction as it arrives from the trace.
///
/// Tags are not part of the record; the simulator assigns them at fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedInst {
    /// Instruction address; carried for logging only.
    pub address: u32,
    /// Operation class: 0, 1, or 2 select a functional-unit type; -1 is an
    /// alias that executes on type 1.
    pub op_class: i32,
    /// Source register indices; negative means "no source".
    pub src_regs: [i32; 2],
    /// Destination register index; negative means "no destination".
    pub dest_reg: i32,
}

/// Anything the fetch stage can draw instructions from.
///
/// `None` is end-of-stream; once returned, the fetch stage never asks again.
pub trait InstructionSource {
    /// Returns the next decoded instruction, or `None` at end of stream.
    fn read_instruction(&mut self) -> Option<DecodedInst>;
}

/// Error produced while reading or validating a text trace.
#[derive(Debug)]
pub enum TraceError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// A line that does not parse as an instruction record.
    Malformed {
        /// 1-based line number of the offending line.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "trace read failed: {}", e),
            TraceError::Malformed { line, text } => {
                write!(f, "malformed trace line {}: {:?}", line, text)
            }
        }
    }
}

impl std::error::Error for TraceError {}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        TraceError::Io(e)
    }
}

/// Reads and validates an entire text trace.
///
/// Format is one instruction per line:
/// `<address-hex> <op_class> <dest> <src1> <src2>`, e.g. `7b034dd0 2 1 2 3`.
/// The address accepts an optional `0x` prefix; blank lines are skipped.
/// Validation is done up front because well-formedness is a precondition of
/// the engine, not a runtime condition it recovers from.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<DecodedInst>, TraceError> {
    let mut insts = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match parse_line(text) {
            Some(inst) => insts.push(inst),
            None => {
                return Err(TraceError::Malformed {
                    line: idx + 1,
                    text: text.to_string(),
                });
            }
        }
    }
    Ok(insts)
}

/// Parses one non-empty trace line. Returns `None` on any field violation.
fn parse_line(text: &str) -> Option<DecodedInst> {
    let mut fields = text.split_whitespace();

    let addr = fields.next()?;
    let addr = addr.strip_prefix("0x").unwrap_or(addr);
    let address = u32::from_str_radix(addr, 16).ok()?;

    let op_class: i32 = fields.next()?.parse().ok()?;
    let dest_reg: i32 = fields.next()?.parse().ok()?;
    let src0: i32 = fields.next()?.parse().ok()?;
    let src1: i32 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }

    if !(-1..=2).contains(&op_class) {
        return None;
    }
    for reg in [dest_reg, src0, src1] {
        if reg >= NUM_REGISTERS as i32 {
            return None;
        }
    }

    Some(DecodedInst {
        address,
        op_class,
        src_regs: [src0, src1],
        dest_reg,
    })
}

/// An `InstructionSource` over an already-parsed instruction list.
pub struct TraceSource {
    queue: VecDeque<DecodedInst>,
}

impl TraceSource {
    /// Wraps a parsed trace for consumption by the fetch stage.
    pub fn new(insts: Vec<DecodedInst>) -> Self {
        Self {
            queue: insts.into(),
        }
    }
}

impl InstructionSource for TraceSource {
    fn read_instruction(&mut self) -> Option<DecodedInst> {
        self.queue.pop_front()
    }
}
