/// Rank of a participant in a process group (0-indexed).
pub type Rank = u32;

/// Wire tag attached to every point-to-point data message.
pub type Tag = u64;

/// Reduction operations understood by the element kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Element-wise sum across ranks.
    Sum,
    /// Element-wise minimum across ranks.
    Min,
    /// Element-wise maximum across ranks.
    Max,
}

impl ReduceOp {
    /// Whether combining a value with itself leaves it unchanged.
    ///
    /// Algorithms that may fold the same contribution in more than once
    /// (dissemination) are only correct for idempotent operations.
    pub const fn is_idempotent(self) -> bool {
        matches!(self, ReduceOp::Min | ReduceOp::Max)
    }
}

impl std::fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReduceOp::Sum => f.write_str("sum"),
            ReduceOp::Min => f.write_str("min"),
            ReduceOp::Max => f.write_str("max"),
        }
    }
}

/// Identifies one round of one collective invocation.
///
/// `sequence` advances in lockstep on every rank with each collective call,
/// so two calls never share a tag even when their rounds overlap in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundTag {
    pub sequence: u32,
    pub round: u32,
}

impl RoundTag {
    pub const fn new(sequence: u32, round: u32) -> Self {
        Self { sequence, round }
    }

    /// Pack into the `u64` wire tag: sequence in the high half, round in the low half.
    pub const fn to_wire(self) -> Tag {
        ((self.sequence as u64) << 32) | self.round as u64
    }

    pub const fn from_wire(tag: Tag) -> Self {
        Self {
            sequence: (tag >> 32) as u32,
            round: tag as u32,
        }
    }
}

impl std::fmt::Display for RoundTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sequence, self.round)
    }
}

/// Current protocol version, exchanged in the TCP handshake.
pub const PROTOCOL_VERSION: u16 = 1;
