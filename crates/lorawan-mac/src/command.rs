//! Typed MAC commands.
//!
//! The same CID means a different command in each direction, e.g. `0x03` is
//! `LinkADRAns` in an uplink and `LinkADRReq` in a downlink. Bit layouts
//! follow LoRaWAN 1.0.4:
//!
//! | Command          | Byte      | Bits                                                  |
//! |------------------|-----------|-------------------------------------------------------|
//! | LinkADRReq       | 0         | DataRate[7:4] TXPower[3:0]                            |
//! |                  | 1..=2     | ChMask (LE)                                           |
//! |                  | 3         | RFU[7] ChMaskCntl[6:4] NbTrans[3:0]                   |
//! | RXParamSetupReq  | 0         | RFU[7] RX1DROffset[6:4] RX2DataRate[3:0]              |
//! |                  | 1..=3     | Frequency (LE, 100 Hz units)                          |
//! | NewChannelReq    | 0,1..=3,4 | ChIndex, Frequency, MaxDR[7:4] MinDR[3:0]             |
//! | TXParamSetupReq  | 0         | RFU[7:6] DownlinkDwell[5] UplinkDwell[4] MaxEIRP[3:0] |
//! | DevStatusAns     | 0, 1      | Battery, RFU[7:6] Margin[5:0] (signed)                |
//! | DeviceTimeAns    | 0..=3, 4  | GPS seconds (LE), fractional second (1/256 s)         |

use crate::table::*;
use crate::types::{check_range, Direction, MacParams};
use crate::MacError;
use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

/// Largest frequency the 24-bit field can carry, in Hz.
pub const MAX_FREQUENCY_HZ: u32 = 0xFF_FFFF * 100;

/// DevStatusAns margin range in dB.
const MARGIN_MIN: i64 = -32;
const MARGIN_MAX: i64 = 31;

/// A MAC command with its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command")]
pub enum MacCommand {
    // ---- uplink ----
    /// Device asks for a link check.
    LinkCheckReq,

    /// Device acknowledges a LinkADRReq.
    LinkAdrAns {
        /// TX power accepted (bit 2).
        power_ack: bool,
        /// Data rate accepted (bit 1).
        data_rate_ack: bool,
        /// Channel mask accepted (bit 0).
        channel_mask_ack: bool,
    },

    /// Device acknowledges a DutyCycleReq.
    DutyCycleAns,

    /// Device acknowledges an RXParamSetupReq.
    RxParamSetupAns {
        /// RX1 data-rate offset accepted (bit 2).
        rx1_dr_offset_ack: bool,
        /// RX2 data rate accepted (bit 1).
        rx2_data_rate_ack: bool,
        /// Channel accepted (bit 0).
        channel_ack: bool,
    },

    /// Device status.
    DevStatusAns {
        /// 0 = external power, 1..254 = level, 255 = unknown.
        battery: u8,
        /// Demodulation SNR margin in dB, -32..=31.
        margin: i8,
    },

    /// Device acknowledges a NewChannelReq.
    NewChannelAns {
        /// Data-rate range usable (bit 1).
        data_rate_range_ok: bool,
        /// Frequency usable (bit 0).
        channel_frequency_ok: bool,
    },

    /// Device acknowledges an RXTimingSetupReq.
    RxTimingSetupAns,

    /// Device acknowledges a TXParamSetupReq.
    TxParamSetupAns,

    /// Device acknowledges a DlChannelReq.
    DlChannelAns {
        /// Uplink frequency exists for the channel (bit 1).
        uplink_frequency_exists: bool,
        /// Downlink frequency usable (bit 0).
        channel_frequency_ok: bool,
    },

    /// Device asks for the network time.
    DeviceTimeReq,

    // ---- downlink ----
    /// Link check result.
    LinkCheckAns {
        /// Demodulation margin in dB.
        margin: u8,
        /// Number of gateways that received the request.
        gateway_count: u8,
    },

    /// Adaptive data rate request.
    LinkAdrReq {
        /// Data rate, 0..=15.
        data_rate: u8,
        /// TX power index, 0..=15.
        tx_power: u8,
        /// Enabled channels.
        channel_mask: u16,
        /// How to interpret the mask, 0..=7.
        channel_mask_control: u8,
        /// Transmissions per uplink, 0..=15.
        nb_trans: u8,
    },

    /// Aggregated duty cycle limit.
    DutyCycleReq {
        /// Max duty cycle exponent, 0..=15.
        max_duty_cycle: u8,
    },

    /// RX window parameters.
    RxParamSetupReq {
        /// RX1 data-rate offset, 0..=7.
        rx1_dr_offset: u8,
        /// RX2 data rate, 0..=15.
        rx2_data_rate: u8,
        /// RX2 frequency in Hz.
        frequency_hz: u32,
    },

    /// Status query.
    DevStatusReq,

    /// Create or modify a channel.
    NewChannelReq {
        /// Channel index.
        channel_index: u8,
        /// Frequency in Hz (0 disables the channel).
        frequency_hz: u32,
        /// Highest data rate, 0..=15.
        max_data_rate: u8,
        /// Lowest data rate, 0..=15.
        min_data_rate: u8,
    },

    /// RX1 delay.
    RxTimingSetupReq {
        /// Delay in seconds (0 means 1), 0..=15.
        delay: u8,
    },

    /// Dwell time and EIRP limits.
    TxParamSetupReq {
        /// Downlink dwell time limited to 400 ms.
        downlink_dwell: bool,
        /// Uplink dwell time limited to 400 ms.
        uplink_dwell: bool,
        /// Max EIRP index, 0..=15.
        max_eirp: u8,
    },

    /// Separate downlink frequency for a channel.
    DlChannelReq {
        /// Channel index.
        channel_index: u8,
        /// Frequency in Hz.
        frequency_hz: u32,
    },

    /// Network time.
    DeviceTimeAns {
        /// Seconds since the GPS epoch.
        gps_seconds: u32,
        /// Fractional second in 1/256 s.
        fraction: u8,
    },
}

// ============================================================================
// Bit Helpers
// ============================================================================

fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

fn status_byte(bit2: bool, bit1: bool, bit0: bool) -> u8 {
    (u8::from(bit2) << 2) | (u8::from(bit1) << 1) | u8::from(bit0)
}

fn checked(name: &str, value: u8, max: u8) -> Result<u8, MacError> {
    check_range(name, value.into(), 0, max.into())?;
    Ok(value)
}

fn put_frequency(buf: &mut BytesMut, hz: u32) -> Result<(), MacError> {
    if hz % 100 != 0 || hz > MAX_FREQUENCY_HZ {
        return Err(MacError::ParameterOutOfRange {
            name: "frequency".to_string(),
            value: hz.into(),
            min: 0,
            max: MAX_FREQUENCY_HZ.into(),
        });
    }
    buf.put_uint_le(u64::from(hz / 100), 3);
    Ok(())
}

fn get_frequency(buf: &mut &[u8]) -> u32 {
    buf.get_uint_le(3) as u32 * 100
}

fn margin_from_wire(byte: u8) -> i8 {
    let raw = (byte & 0x3F) as i8;
    if raw > 31 {
        raw - 64
    } else {
        raw
    }
}

impl MacCommand {
    /// Command identifier.
    pub fn cid(&self) -> u8 {
        match self {
            MacCommand::LinkCheckReq | MacCommand::LinkCheckAns { .. } => CID_LINK_CHECK,
            MacCommand::LinkAdrAns { .. } | MacCommand::LinkAdrReq { .. } => CID_LINK_ADR,
            MacCommand::DutyCycleAns | MacCommand::DutyCycleReq { .. } => CID_DUTY_CYCLE,
            MacCommand::RxParamSetupAns { .. } | MacCommand::RxParamSetupReq { .. } => CID_RX_PARAM_SETUP,
            MacCommand::DevStatusAns { .. } | MacCommand::DevStatusReq => CID_DEV_STATUS,
            MacCommand::NewChannelAns { .. } | MacCommand::NewChannelReq { .. } => CID_NEW_CHANNEL,
            MacCommand::RxTimingSetupAns | MacCommand::RxTimingSetupReq { .. } => CID_RX_TIMING_SETUP,
            MacCommand::TxParamSetupAns | MacCommand::TxParamSetupReq { .. } => CID_TX_PARAM_SETUP,
            MacCommand::DlChannelAns { .. } | MacCommand::DlChannelReq { .. } => CID_DL_CHANNEL,
            MacCommand::DeviceTimeReq | MacCommand::DeviceTimeAns { .. } => CID_DEVICE_TIME,
        }
    }

    /// Direction this command travels in.
    pub fn direction(&self) -> Direction {
        match self {
            MacCommand::LinkCheckReq
            | MacCommand::LinkAdrAns { .. }
            | MacCommand::DutyCycleAns
            | MacCommand::RxParamSetupAns { .. }
            | MacCommand::DevStatusAns { .. }
            | MacCommand::NewChannelAns { .. }
            | MacCommand::RxTimingSetupAns
            | MacCommand::TxParamSetupAns
            | MacCommand::DlChannelAns { .. }
            | MacCommand::DeviceTimeReq => Direction::Uplink,
            _ => Direction::Downlink,
        }
    }

    /// Full command name, e.g. `LinkADRReq`.
    pub fn name(&self) -> &'static str {
        match self {
            MacCommand::LinkCheckReq => "LinkCheckReq",
            MacCommand::LinkAdrAns { .. } => "LinkADRAns",
            MacCommand::DutyCycleAns => "DutyCycleAns",
            MacCommand::RxParamSetupAns { .. } => "RXParamSetupAns",
            MacCommand::DevStatusAns { .. } => "DevStatusAns",
            MacCommand::NewChannelAns { .. } => "NewChannelAns",
            MacCommand::RxTimingSetupAns => "RXTimingSetupAns",
            MacCommand::TxParamSetupAns => "TXParamSetupAns",
            MacCommand::DlChannelAns { .. } => "DlChannelAns",
            MacCommand::DeviceTimeReq => "DeviceTimeReq",
            MacCommand::LinkCheckAns { .. } => "LinkCheckAns",
            MacCommand::LinkAdrReq { .. } => "LinkADRReq",
            MacCommand::DutyCycleReq { .. } => "DutyCycleReq",
            MacCommand::RxParamSetupReq { .. } => "RXParamSetupReq",
            MacCommand::DevStatusReq => "DevStatusReq",
            MacCommand::NewChannelReq { .. } => "NewChannelReq",
            MacCommand::RxTimingSetupReq { .. } => "RXTimingSetupReq",
            MacCommand::TxParamSetupReq { .. } => "TXParamSetupReq",
            MacCommand::DlChannelReq { .. } => "DlChannelReq",
            MacCommand::DeviceTimeAns { .. } => "DeviceTimeAns",
        }
    }

    /// Serialize the command, CID first.
    pub fn encode(&self) -> Result<Vec<u8>, MacError> {
        let mut buf = BytesMut::with_capacity(6);
        buf.put_u8(self.cid());

        match self {
            MacCommand::LinkCheckReq
            | MacCommand::DutyCycleAns
            | MacCommand::RxTimingSetupAns
            | MacCommand::TxParamSetupAns
            | MacCommand::DeviceTimeReq
            | MacCommand::DevStatusReq => {}

            MacCommand::LinkAdrAns {
                power_ack,
                data_rate_ack,
                channel_mask_ack,
            } => buf.put_u8(status_byte(*power_ack, *data_rate_ack, *channel_mask_ack)),

            MacCommand::RxParamSetupAns {
                rx1_dr_offset_ack,
                rx2_data_rate_ack,
                channel_ack,
            } => buf.put_u8(status_byte(*rx1_dr_offset_ack, *rx2_data_rate_ack, *channel_ack)),

            MacCommand::DevStatusAns { battery, margin } => {
                check_range("margin", (*margin).into(), MARGIN_MIN, MARGIN_MAX)?;
                buf.put_u8(*battery);
                buf.put_u8((*margin as u8) & 0x3F);
            }

            MacCommand::NewChannelAns {
                data_rate_range_ok,
                channel_frequency_ok,
            } => buf.put_u8(status_byte(false, *data_rate_range_ok, *channel_frequency_ok)),

            MacCommand::DlChannelAns {
                uplink_frequency_exists,
                channel_frequency_ok,
            } => buf.put_u8(status_byte(false, *uplink_frequency_exists, *channel_frequency_ok)),

            MacCommand::LinkCheckAns { margin, gateway_count } => {
                buf.put_u8(*margin);
                buf.put_u8(*gateway_count);
            }

            MacCommand::LinkAdrReq {
                data_rate,
                tx_power,
                channel_mask,
                channel_mask_control,
                nb_trans,
            } => {
                let dr = checked("data_rate", *data_rate, 15)?;
                let power = checked("tx_power", *tx_power, 15)?;
                let cntl = checked("channel_mask_control", *channel_mask_control, 7)?;
                let nb = checked("nb_trans", *nb_trans, 15)?;
                buf.put_u8((dr << 4) | power);
                buf.put_u16_le(*channel_mask);
                buf.put_u8((cntl << 4) | nb);
            }

            MacCommand::DutyCycleReq { max_duty_cycle } => {
                buf.put_u8(checked("max_duty_cycle", *max_duty_cycle, 15)?);
            }

            MacCommand::RxParamSetupReq {
                rx1_dr_offset,
                rx2_data_rate,
                frequency_hz,
            } => {
                let offset = checked("rx1_dr_offset", *rx1_dr_offset, 7)?;
                let dr = checked("rx2_data_rate", *rx2_data_rate, 15)?;
                buf.put_u8((offset << 4) | dr);
                put_frequency(&mut buf, *frequency_hz)?;
            }

            MacCommand::NewChannelReq {
                channel_index,
                frequency_hz,
                max_data_rate,
                min_data_rate,
            } => {
                let max = checked("max_data_rate", *max_data_rate, 15)?;
                let min = checked("min_data_rate", *min_data_rate, 15)?;
                buf.put_u8(*channel_index);
                put_frequency(&mut buf, *frequency_hz)?;
                buf.put_u8((max << 4) | min);
            }

            MacCommand::RxTimingSetupReq { delay } => {
                buf.put_u8(checked("delay", *delay, 15)?);
            }

            MacCommand::TxParamSetupReq {
                downlink_dwell,
                uplink_dwell,
                max_eirp,
            } => {
                let eirp = checked("max_eirp", *max_eirp, 15)?;
                buf.put_u8((u8::from(*downlink_dwell) << 5) | (u8::from(*uplink_dwell) << 4) | eirp);
            }

            MacCommand::DlChannelReq {
                channel_index,
                frequency_hz,
            } => {
                buf.put_u8(*channel_index);
                put_frequency(&mut buf, *frequency_hz)?;
            }

            MacCommand::DeviceTimeAns { gps_seconds, fraction } => {
                buf.put_u32_le(*gps_seconds);
                buf.put_u8(*fraction);
            }
        }

        Ok(buf.to_vec())
    }

    /// Decode a command payload (bytes after the CID).
    ///
    /// `payload` must be at least the table length for the direction; extra
    /// bytes are not consumed.
    pub fn decode(cid: u8, direction: Direction, payload: &[u8]) -> Result<Self, MacError> {
        let def = lookup(cid).ok_or(MacError::UnknownCommandId { cid, offset: 0 })?;
        let needed = def.payload_len(direction);
        if payload.len() < needed {
            return Err(MacError::TruncatedPayload {
                name: def.name,
                needed,
                available: payload.len(),
            });
        }

        let mut buf = &payload[..needed];
        let command = match (direction, cid) {
            (Direction::Uplink, CID_LINK_CHECK) => MacCommand::LinkCheckReq,
            (Direction::Uplink, CID_LINK_ADR) => {
                let s = buf.get_u8();
                MacCommand::LinkAdrAns {
                    power_ack: bit(s, 2),
                    data_rate_ack: bit(s, 1),
                    channel_mask_ack: bit(s, 0),
                }
            }
            (Direction::Uplink, CID_DUTY_CYCLE) => MacCommand::DutyCycleAns,
            (Direction::Uplink, CID_RX_PARAM_SETUP) => {
                let s = buf.get_u8();
                MacCommand::RxParamSetupAns {
                    rx1_dr_offset_ack: bit(s, 2),
                    rx2_data_rate_ack: bit(s, 1),
                    channel_ack: bit(s, 0),
                }
            }
            (Direction::Uplink, CID_DEV_STATUS) => MacCommand::DevStatusAns {
                battery: buf.get_u8(),
                margin: margin_from_wire(buf.get_u8()),
            },
            (Direction::Uplink, CID_NEW_CHANNEL) => {
                let s = buf.get_u8();
                MacCommand::NewChannelAns {
                    data_rate_range_ok: bit(s, 1),
                    channel_frequency_ok: bit(s, 0),
                }
            }
            (Direction::Uplink, CID_RX_TIMING_SETUP) => MacCommand::RxTimingSetupAns,
            (Direction::Uplink, CID_TX_PARAM_SETUP) => MacCommand::TxParamSetupAns,
            (Direction::Uplink, CID_DL_CHANNEL) => {
                let s = buf.get_u8();
                MacCommand::DlChannelAns {
                    uplink_frequency_exists: bit(s, 1),
                    channel_frequency_ok: bit(s, 0),
                }
            }
            (Direction::Uplink, CID_DEVICE_TIME) => MacCommand::DeviceTimeReq,

            (Direction::Downlink, CID_LINK_CHECK) => MacCommand::LinkCheckAns {
                margin: buf.get_u8(),
                gateway_count: buf.get_u8(),
            },
            (Direction::Downlink, CID_LINK_ADR) => {
                let dr_power = buf.get_u8();
                let channel_mask = buf.get_u16_le();
                let redundancy = buf.get_u8();
                MacCommand::LinkAdrReq {
                    data_rate: dr_power >> 4,
                    tx_power: dr_power & 0x0F,
                    channel_mask,
                    channel_mask_control: (redundancy >> 4) & 0x07,
                    nb_trans: redundancy & 0x0F,
                }
            }
            (Direction::Downlink, CID_DUTY_CYCLE) => MacCommand::DutyCycleReq {
                max_duty_cycle: buf.get_u8() & 0x0F,
            },
            (Direction::Downlink, CID_RX_PARAM_SETUP) => {
                let settings = buf.get_u8();
                MacCommand::RxParamSetupReq {
                    rx1_dr_offset: (settings >> 4) & 0x07,
                    rx2_data_rate: settings & 0x0F,
                    frequency_hz: get_frequency(&mut buf),
                }
            }
            (Direction::Downlink, CID_DEV_STATUS) => MacCommand::DevStatusReq,
            (Direction::Downlink, CID_NEW_CHANNEL) => {
                let channel_index = buf.get_u8();
                let frequency_hz = get_frequency(&mut buf);
                let dr_range = buf.get_u8();
                MacCommand::NewChannelReq {
                    channel_index,
                    frequency_hz,
                    max_data_rate: dr_range >> 4,
                    min_data_rate: dr_range & 0x0F,
                }
            }
            (Direction::Downlink, CID_RX_TIMING_SETUP) => MacCommand::RxTimingSetupReq {
                delay: buf.get_u8() & 0x0F,
            },
            (Direction::Downlink, CID_TX_PARAM_SETUP) => {
                let b = buf.get_u8();
                MacCommand::TxParamSetupReq {
                    downlink_dwell: bit(b, 5),
                    uplink_dwell: bit(b, 4),
                    max_eirp: b & 0x0F,
                }
            }
            (Direction::Downlink, CID_DL_CHANNEL) => MacCommand::DlChannelReq {
                channel_index: buf.get_u8(),
                frequency_hz: get_frequency(&mut buf),
            },
            (Direction::Downlink, CID_DEVICE_TIME) => MacCommand::DeviceTimeAns {
                gps_seconds: buf.get_u32_le(),
                fraction: buf.get_u8(),
            },
            _ => return Err(MacError::UnknownCommandId { cid, offset: 0 }),
        };

        Ok(command)
    }

    /// Build a command from named parameters.
    ///
    /// Parameter names match the field names (`data_rate`, `frequency`, ...);
    /// frequencies are in Hz.
    pub fn from_params(cid: u8, direction: Direction, params: &MacParams) -> Result<Self, MacError> {
        if lookup(cid).is_none() {
            return Err(MacError::UnknownCommandId { cid, offset: 0 });
        }

        let byte = |name: &str, max: i64| params.number(name, 0, max).map(|v| v as u8);
        let frequency = || params.number("frequency", 0, MAX_FREQUENCY_HZ.into()).map(|v| v as u32);

        let command = match (direction, cid) {
            (Direction::Uplink, CID_LINK_CHECK) => MacCommand::LinkCheckReq,
            (Direction::Uplink, CID_LINK_ADR) => MacCommand::LinkAdrAns {
                power_ack: params.flag("power_ack"),
                data_rate_ack: params.flag("data_rate_ack"),
                channel_mask_ack: params.flag("channel_mask_ack"),
            },
            (Direction::Uplink, CID_DUTY_CYCLE) => MacCommand::DutyCycleAns,
            (Direction::Uplink, CID_RX_PARAM_SETUP) => MacCommand::RxParamSetupAns {
                rx1_dr_offset_ack: params.flag("rx1_dr_offset_ack"),
                rx2_data_rate_ack: params.flag("rx2_data_rate_ack"),
                channel_ack: params.flag("channel_ack"),
            },
            (Direction::Uplink, CID_DEV_STATUS) => MacCommand::DevStatusAns {
                battery: byte("battery", 255)?,
                margin: params.number("margin", MARGIN_MIN, MARGIN_MAX)? as i8,
            },
            (Direction::Uplink, CID_NEW_CHANNEL) => MacCommand::NewChannelAns {
                data_rate_range_ok: params.flag("data_rate_range_ok"),
                channel_frequency_ok: params.flag("channel_frequency_ok"),
            },
            (Direction::Uplink, CID_RX_TIMING_SETUP) => MacCommand::RxTimingSetupAns,
            (Direction::Uplink, CID_TX_PARAM_SETUP) => MacCommand::TxParamSetupAns,
            (Direction::Uplink, CID_DL_CHANNEL) => MacCommand::DlChannelAns {
                uplink_frequency_exists: params.flag("uplink_frequency_exists"),
                channel_frequency_ok: params.flag("channel_frequency_ok"),
            },
            (Direction::Uplink, CID_DEVICE_TIME) => MacCommand::DeviceTimeReq,

            (Direction::Downlink, CID_LINK_CHECK) => MacCommand::LinkCheckAns {
                margin: byte("margin", 255)?,
                gateway_count: byte("gateway_count", 255)?,
            },
            (Direction::Downlink, CID_LINK_ADR) => MacCommand::LinkAdrReq {
                data_rate: byte("data_rate", 15)?,
                tx_power: byte("tx_power", 15)?,
                channel_mask: params.number("channel_mask", 0, u16::MAX.into())? as u16,
                channel_mask_control: byte("channel_mask_control", 7)?,
                nb_trans: byte("nb_trans", 15)?,
            },
            (Direction::Downlink, CID_DUTY_CYCLE) => MacCommand::DutyCycleReq {
                max_duty_cycle: byte("max_duty_cycle", 15)?,
            },
            (Direction::Downlink, CID_RX_PARAM_SETUP) => MacCommand::RxParamSetupReq {
                rx1_dr_offset: byte("rx1_dr_offset", 7)?,
                rx2_data_rate: byte("rx2_data_rate", 15)?,
                frequency_hz: frequency()?,
            },
            (Direction::Downlink, CID_DEV_STATUS) => MacCommand::DevStatusReq,
            (Direction::Downlink, CID_NEW_CHANNEL) => MacCommand::NewChannelReq {
                channel_index: byte("channel_index", 255)?,
                frequency_hz: frequency()?,
                max_data_rate: byte("max_data_rate", 15)?,
                min_data_rate: byte("min_data_rate", 15)?,
            },
            (Direction::Downlink, CID_RX_TIMING_SETUP) => MacCommand::RxTimingSetupReq {
                delay: byte("delay", 15)?,
            },
            (Direction::Downlink, CID_TX_PARAM_SETUP) => MacCommand::TxParamSetupReq {
                downlink_dwell: params.flag("downlink_dwell"),
                uplink_dwell: params.flag("uplink_dwell"),
                max_eirp: byte("max_eirp", 15)?,
            },
            (Direction::Downlink, CID_DL_CHANNEL) => MacCommand::DlChannelReq {
                channel_index: byte("channel_index", 255)?,
                frequency_hz: frequency()?,
            },
            (Direction::Downlink, CID_DEVICE_TIME) => MacCommand::DeviceTimeAns {
                gps_seconds: params.number("gps_seconds", 0, u32::MAX.into())? as u32,
                fraction: byte("fraction", 255)?,
            },
            _ => return Err(MacError::UnknownCommandId { cid, offset: 0 }),
        };

        Ok(command)
    }

    /// Fields as `(name, display value)` pairs.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let flag = |b: &bool| (if *b { "1" } else { "0" }).to_string();

        match self {
            MacCommand::LinkCheckReq
            | MacCommand::DutyCycleAns
            | MacCommand::RxTimingSetupAns
            | MacCommand::TxParamSetupAns
            | MacCommand::DeviceTimeReq
            | MacCommand::DevStatusReq => Vec::new(),
            MacCommand::LinkAdrAns {
                power_ack,
                data_rate_ack,
                channel_mask_ack,
            } => vec![
                ("power_ack", flag(power_ack)),
                ("data_rate_ack", flag(data_rate_ack)),
                ("channel_mask_ack", flag(channel_mask_ack)),
            ],
            MacCommand::RxParamSetupAns {
                rx1_dr_offset_ack,
                rx2_data_rate_ack,
                channel_ack,
            } => vec![
                ("rx1_dr_offset_ack", flag(rx1_dr_offset_ack)),
                ("rx2_data_rate_ack", flag(rx2_data_rate_ack)),
                ("channel_ack", flag(channel_ack)),
            ],
            MacCommand::DevStatusAns { battery, margin } => vec![
                ("battery", battery.to_string()),
                ("margin", format!("{} dB", margin)),
            ],
            MacCommand::NewChannelAns {
                data_rate_range_ok,
                channel_frequency_ok,
            } => vec![
                ("data_rate_range_ok", flag(data_rate_range_ok)),
                ("channel_frequency_ok", flag(channel_frequency_ok)),
            ],
            MacCommand::DlChannelAns {
                uplink_frequency_exists,
                channel_frequency_ok,
            } => vec![
                ("uplink_frequency_exists", flag(uplink_frequency_exists)),
                ("channel_frequency_ok", flag(channel_frequency_ok)),
            ],
            MacCommand::LinkCheckAns { margin, gateway_count } => vec![
                ("margin", format!("{} dB", margin)),
                ("gateway_count", gateway_count.to_string()),
            ],
            MacCommand::LinkAdrReq {
                data_rate,
                tx_power,
                channel_mask,
                channel_mask_control,
                nb_trans,
            } => vec![
                ("data_rate", data_rate.to_string()),
                ("tx_power", tx_power.to_string()),
                ("channel_mask", format!("0x{:04X}", channel_mask)),
                ("channel_mask_control", channel_mask_control.to_string()),
                ("nb_trans", nb_trans.to_string()),
            ],
            MacCommand::DutyCycleReq { max_duty_cycle } => {
                vec![("max_duty_cycle", max_duty_cycle.to_string())]
            }
            MacCommand::RxParamSetupReq {
                rx1_dr_offset,
                rx2_data_rate,
                frequency_hz,
            } => vec![
                ("rx1_dr_offset", rx1_dr_offset.to_string()),
                ("rx2_data_rate", rx2_data_rate.to_string()),
                ("frequency", format!("{} Hz", frequency_hz)),
            ],
            MacCommand::NewChannelReq {
                channel_index,
                frequency_hz,
                max_data_rate,
                min_data_rate,
            } => vec![
                ("channel_index", channel_index.to_string()),
                ("frequency", format!("{} Hz", frequency_hz)),
                ("max_data_rate", max_data_rate.to_string()),
                ("min_data_rate", min_data_rate.to_string()),
            ],
            MacCommand::RxTimingSetupReq { delay } => vec![("delay", delay.to_string())],
            MacCommand::TxParamSetupReq {
                downlink_dwell,
                uplink_dwell,
                max_eirp,
            } => vec![
                ("downlink_dwell", flag(downlink_dwell)),
                ("uplink_dwell", flag(uplink_dwell)),
                ("max_eirp", max_eirp.to_string()),
            ],
            MacCommand::DlChannelReq {
                channel_index,
                frequency_hz,
            } => vec![
                ("channel_index", channel_index.to_string()),
                ("frequency", format!("{} Hz", frequency_hz)),
            ],
            MacCommand::DeviceTimeAns { gps_seconds, fraction } => vec![
                ("gps_seconds", gps_seconds.to_string()),
                ("fraction", fraction.to_string()),
            ],
        }
    }
}
