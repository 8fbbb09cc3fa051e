//! MAC command scenarios and round trips.

use lorawan_mac::*;

/// One command per CID and direction, with non-trivial field values.
fn every_command() -> Vec<MacCommand> {
    vec![
        MacCommand::LinkCheckReq,
        MacCommand::LinkAdrAns {
            power_ack: true,
            data_rate_ack: false,
            channel_mask_ack: true,
        },
        MacCommand::DutyCycleAns,
        MacCommand::RxParamSetupAns {
            rx1_dr_offset_ack: false,
            rx2_data_rate_ack: true,
            channel_ack: true,
        },
        MacCommand::DevStatusAns {
            battery: 200,
            margin: -32,
        },
        MacCommand::NewChannelAns {
            data_rate_range_ok: true,
            channel_frequency_ok: false,
        },
        MacCommand::RxTimingSetupAns,
        MacCommand::TxParamSetupAns,
        MacCommand::DlChannelAns {
            uplink_frequency_exists: false,
            channel_frequency_ok: true,
        },
        MacCommand::DeviceTimeReq,
        MacCommand::LinkCheckAns {
            margin: 20,
            gateway_count: 3,
        },
        MacCommand::LinkAdrReq {
            data_rate: 15,
            tx_power: 7,
            channel_mask: 0xFF00,
            channel_mask_control: 6,
            nb_trans: 15,
        },
        MacCommand::DutyCycleReq { max_duty_cycle: 9 },
        MacCommand::RxParamSetupReq {
            rx1_dr_offset: 7,
            rx2_data_rate: 3,
            frequency_hz: 869_525_000,
        },
        MacCommand::DevStatusReq,
        MacCommand::NewChannelReq {
            channel_index: 15,
            frequency_hz: 868_300_000,
            max_data_rate: 7,
            min_data_rate: 1,
        },
        MacCommand::RxTimingSetupReq { delay: 1 },
        MacCommand::TxParamSetupReq {
            downlink_dwell: true,
            uplink_dwell: false,
            max_eirp: 13,
        },
        MacCommand::DlChannelReq {
            channel_index: 2,
            frequency_hz: 868_100_000,
        },
        MacCommand::DeviceTimeAns {
            gps_seconds: 1_300_000_000,
            fraction: 255,
        },
    ]
}

#[test]
fn test_scenario_link_adr_req() {
    let params = MacParams::new()
        .with("data_rate", 5)
        .with("tx_power", 3)
        .with("channel_mask", 0x0003)
        .with("channel_mask_control", 0)
        .with("nb_trans", 1);
    let hex = encode(0x03, Direction::Downlink, &params).unwrap();
    assert_eq!(hex, format!("{}{}{}{}", "03", "53", "0300", "01"));
}

#[test]
fn test_scenario_truncated_rx_param_setup() {
    let result = decode("05", Direction::Downlink);
    assert!(result.records.is_empty());
    let err = result.error.unwrap();
    assert_eq!(
        err,
        MacError::TruncatedPayload {
            name: "RXParamSetup",
            needed: 4,
            available: 0,
        }
    );
    assert!(err.to_string().contains("RXParamSetup"));
    assert!(err.to_string().contains("needed 4, has 0"));
}

#[test]
fn test_round_trip_every_command() {
    let commands = every_command();
    assert_eq!(commands.len(), MAC_COMMANDS.len() * 2);

    for command in commands {
        let direction = command.direction();
        let hex = encode_commands(std::slice::from_ref(&command), direction).unwrap();
        let result = decode(&hex, direction);

        assert!(result.is_complete(), "{}: {:?}", command.name(), result.error);
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.cid, command.cid());
        assert_eq!(record.name, command.name());
        assert_eq!(record.len, lookup(command.cid()).unwrap().payload_len(direction));
        assert_eq!(record.raw.len(), record.len + 1);
        assert_eq!(record.command.as_ref(), Some(&command));
    }
}

#[test]
fn test_every_cid_has_both_directions() {
    let commands = every_command();
    for def in MAC_COMMANDS.iter() {
        for direction in [Direction::Uplink, Direction::Downlink] {
            assert!(
                commands.iter().any(|c| c.cid() == def.cid && c.direction() == direction),
                "{} {}",
                def.name,
                direction
            );
        }
    }
}

#[test]
fn test_concatenated_downlink() {
    let commands = vec![
        MacCommand::DevStatusReq,
        MacCommand::LinkAdrReq {
            data_rate: 5,
            tx_power: 3,
            channel_mask: 0x0003,
            channel_mask_control: 0,
            nb_trans: 1,
        },
        MacCommand::RxTimingSetupReq { delay: 2 },
    ];
    let hex = encode_commands(&commands, Direction::Downlink).unwrap();
    assert_eq!(hex, "0603530300010802");

    let result = decode("06 03 53 03 00 01 08 02", Direction::Downlink);
    assert!(result.is_complete());
    let decoded: Vec<MacCommand> = result.records.into_iter().filter_map(|r| r.command).collect();
    assert_eq!(decoded, commands);
}

#[test]
fn test_truncation_mid_sequence_keeps_prefix() {
    // DevStatusReq, then a LinkADRReq missing its last byte
    let result = decode("0603530300", Direction::Downlink);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].name, "DevStatusReq");
    assert_eq!(
        result.error,
        Some(MacError::TruncatedPayload {
            name: "LinkADR",
            needed: 4,
            available: 3,
        })
    );
}

#[test]
fn test_same_bytes_differ_by_direction() {
    let up = decode("0305", Direction::Uplink);
    assert_eq!(up.records[0].name, "LinkADRAns");
    assert!(up.is_complete());

    let down = decode("0305", Direction::Downlink);
    assert!(down.records.is_empty());
    assert!(matches!(down.error, Some(MacError::TruncatedPayload { .. })));
}

#[test]
fn test_display_params() {
    let result = decode("0614FF", Direction::Downlink);
    // downlink DevStatusReq has no payload, so 0x14 is an unknown CID
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.error, Some(MacError::UnknownCommandId { cid: 0x14, offset: 1 }));

    let result = decode("0528F87D84", Direction::Downlink);
    let params = &result.records[0].params;
    assert_eq!(params[0], ("rx1_dr_offset", "2".to_string()));
    assert_eq!(params[1], ("rx2_data_rate", "8".to_string()));
    assert_eq!(params[2], ("frequency", "868300000 Hz".to_string()));
}

#[test]
fn test_json_shape() {
    let result = decode("0353030001", Direction::Downlink);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["records"][0]["name"], "LinkADRReq");
    assert_eq!(json["records"][0]["raw"], "0353030001");
    assert_eq!(json["records"][0]["command"]["command"], "LinkAdrReq");
    assert_eq!(json["records"][0]["command"]["data_rate"], 5);
    assert!(json["error"].is_null());

    let json = serde_json::to_value(decode("05", Direction::Downlink)).unwrap();
    assert_eq!(json["error"], "truncated payload for RXParamSetup: needed 4, has 0");
}
