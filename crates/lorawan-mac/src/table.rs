//! MAC command table.
//!
//! The payload length after the CID depends on the direction:
//!
//! | CID  | Name          | Uplink | Downlink |
//! |------|---------------|--------|----------|
//! | 0x02 | LinkCheck     | 0      | 2        |
//! | 0x03 | LinkADR       | 1      | 4        |
//! | 0x04 | DutyCycle     | 0      | 1        |
//! | 0x05 | RXParamSetup  | 1      | 4        |
//! | 0x06 | DevStatus     | 2      | 0        |
//! | 0x07 | NewChannel    | 1      | 5        |
//! | 0x08 | RXTimingSetup | 0      | 1        |
//! | 0x09 | TXParamSetup  | 0      | 1        |
//! | 0x0A | DlChannel     | 1      | 4        |
//! | 0x0D | DeviceTime    | 0      | 5        |

use crate::types::Direction;
use serde::Serialize;

// ============================================================================
// Command Identifiers
// ============================================================================

/// LinkCheckReq / LinkCheckAns.
pub const CID_LINK_CHECK: u8 = 0x02;
/// LinkADRReq / LinkADRAns.
pub const CID_LINK_ADR: u8 = 0x03;
/// DutyCycleReq / DutyCycleAns.
pub const CID_DUTY_CYCLE: u8 = 0x04;
/// RXParamSetupReq / RXParamSetupAns.
pub const CID_RX_PARAM_SETUP: u8 = 0x05;
/// DevStatusReq / DevStatusAns.
pub const CID_DEV_STATUS: u8 = 0x06;
/// NewChannelReq / NewChannelAns.
pub const CID_NEW_CHANNEL: u8 = 0x07;
/// RXTimingSetupReq / RXTimingSetupAns.
pub const CID_RX_TIMING_SETUP: u8 = 0x08;
/// TXParamSetupReq / TXParamSetupAns.
pub const CID_TX_PARAM_SETUP: u8 = 0x09;
/// DlChannelReq / DlChannelAns.
pub const CID_DL_CHANNEL: u8 = 0x0A;
/// DeviceTimeReq / DeviceTimeAns.
pub const CID_DEVICE_TIME: u8 = 0x0D;

/// First proprietary identifier.
pub const CID_PROPRIETARY_MIN: u8 = 0x80;

/// Name reported for proprietary records.
pub const PROPRIETARY_NAME: &str = "Proprietary/Unknown";

// ============================================================================
// Table
// ============================================================================

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacCommandDef {
    /// Command identifier.
    pub cid: u8,
    /// Base name, without Req/Ans.
    pub name: &'static str,
    /// Payload bytes after the CID in an uplink.
    pub uplink_len: usize,
    /// Payload bytes after the CID in a downlink.
    pub downlink_len: usize,
}

impl MacCommandDef {
    /// Payload length for a direction.
    pub fn payload_len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Uplink => self.uplink_len,
            Direction::Downlink => self.downlink_len,
        }
    }
}

const fn def(cid: u8, name: &'static str, uplink_len: usize, downlink_len: usize) -> MacCommandDef {
    MacCommandDef {
        cid,
        name,
        uplink_len,
        downlink_len,
    }
}

/// Every supported command, by CID.
pub const MAC_COMMANDS: [MacCommandDef; 10] = [
    def(CID_LINK_CHECK, "LinkCheck", 0, 2),
    def(CID_LINK_ADR, "LinkADR", 1, 4),
    def(CID_DUTY_CYCLE, "DutyCycle", 0, 1),
    def(CID_RX_PARAM_SETUP, "RXParamSetup", 1, 4),
    def(CID_DEV_STATUS, "DevStatus", 2, 0),
    def(CID_NEW_CHANNEL, "NewChannel", 1, 5),
    def(CID_RX_TIMING_SETUP, "RXTimingSetup", 0, 1),
    def(CID_TX_PARAM_SETUP, "TXParamSetup", 0, 1),
    def(CID_DL_CHANNEL, "DlChannel", 1, 4),
    def(CID_DEVICE_TIME, "DeviceTime", 0, 5),
];

/// Look up a command by CID.
pub fn lookup(cid: u8) -> Option<&'static MacCommandDef> {
    MAC_COMMANDS.iter().find(|d| d.cid == cid)
}
