use crate::types::Rank;

/// Everything that crosses a link between two ranks.
///
/// Vector payloads travel as opaque little-endian bytes inside `Data`;
/// only the envelope goes through rkyv.
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, Debug, Clone, PartialEq)]
pub enum Frame {
    /// First frame on a TCP connection, identifying the connecting rank.
    Hello {
        rank: Rank,
        world_size: u32,
        protocol_version: u16,
    },

    /// Tagged point-to-point payload.
    ///
    /// The derive introduces its own `Tag` type for the discriminant, so the
    /// wire tag alias is spelled out in full.
    Data {
        tag: crate::types::Tag,
        payload: Vec<u8>,
    },

    /// Barrier arrival for `epoch`.
    Barrier { epoch: u64 },

    /// Barrier release from the coordinator for `epoch`.
    BarrierAck { epoch: u64 },
}

impl Frame {
    /// Control frames are routed to the control lane; data frames to tag lanes.
    pub fn is_control(&self) -> bool {
        matches!(self, Frame::Barrier { .. } | Frame::BarrierAck { .. })
    }
}
