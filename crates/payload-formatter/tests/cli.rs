//! End-to-end runs of the `lpf` commands through the library entry point.

use clap::Parser;
use payload_formatter::*;
use std::path::PathBuf;

fn invoke(args: &[&str], config: &Config) -> Result<Output> {
    let cli = Cli::try_parse_from(std::iter::once("lpf").chain(args.iter().copied()))
        .map_err(|e| CliError::invalid(e.to_string()))?;
    let config = cli.apply(config.clone());
    run(&cli.command, &config)
}

fn compact() -> Config {
    Config {
        spaced_hex: false,
        ..Config::default()
    }
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_str(&output.text).unwrap()
}

#[test]
fn test_encode_scaled_alarm() {
    let output = invoke(
        &["downlink", "encode", "--type", "0x5_0", "--command", "5", "--value", "12.345"],
        &compact(),
    )
    .unwrap();
    assert!(output.text.starts_with("Hex:        8000085000050539300000BE"));
    assert!(output.text.contains("Extra:      00"));
}

#[test]
fn test_encode_negative_value() {
    let output = invoke(
        &[
            "--json", "downlink", "encode", "--type", "0x6", "--command", "1_4", "--value", "-5",
        ],
        &Config::default(),
    )
    .unwrap();
    assert_eq!(json(&output)["breakdown"]["data"], "FBFFFFFF");
}

#[test]
fn test_encode_then_decode_schedule() {
    let output = invoke(
        &[
            "--json",
            "downlink",
            "encode",
            "--type",
            "device-config",
            "--command",
            "2_2",
            "--seq",
            "9",
            "--schedule",
            "mode=basic,days=sat+sun,start=06:00,end=18:30,interval=900",
        ],
        &Config::default(),
    )
    .unwrap();
    let hex = json(&output)["hex"].as_str().unwrap().to_string();

    let decoded = invoke(&["--json", "downlink", "decode", &hex], &Config::default()).unwrap();
    let value = json(&decoded);
    assert_eq!(value["header"]["sequence"], 9);
    assert_eq!(value["command_name"], "Schedule");
    let fields = value["fields"].as_array().unwrap();
    let field = |name: &str| {
        fields
            .iter()
            .find(|f| f["name"] == name)
            .map(|f| f["value"].as_str().unwrap().to_string())
    };
    assert_eq!(field("Mode").as_deref(), Some("Basic"));
    assert_eq!(field("Days").as_deref(), Some("S,S"));
    assert_eq!(field("Start").as_deref(), Some("6:00"));
    assert_eq!(field("End").as_deref(), Some("18:30"));
    assert_eq!(field("Interval").as_deref(), Some("900 sec"));
}

#[test]
fn test_encode_timestamp_text() {
    let output = invoke(
        &[
            "--json",
            "downlink",
            "encode",
            "--type",
            "0x6",
            "--command",
            "1_1",
            "--value",
            "2023-11-14T22:13:20Z",
        ],
        &Config::default(),
    )
    .unwrap();
    // 1_700_000_000 little-endian
    assert_eq!(json(&output)["breakdown"]["data"], "00F15365");
}

#[test]
fn test_encode_missing_value() {
    let err = invoke(&["downlink", "encode", "--type", "0x1", "--command", "1"], &Config::default()).unwrap_err();
    assert!(matches!(err, CliError::InvalidArgument(_)));
}

#[test]
fn test_encode_bad_channel() {
    let err = invoke(
        &["downlink", "encode", "--type", "0x0", "--command", "3", "--channel", "16"],
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Codec(_)));
}

#[test]
fn test_decode_checksum_error() {
    let err = invoke(&["downlink", "decode", "80 05 04 02 01 02 00 BD"], &Config::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "downlink: checksum mismatch: expected 0xBC, found 0xBD"
    );
}

#[test]
fn test_list_one_type() {
    let output = invoke(&["--json", "downlink", "list", "--type", "rs485-coil"], &Config::default()).unwrap();
    let rows = json(&output);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Write Coil");
    assert_eq!(rows[1]["command"], "128");
}

#[test]
fn test_mac_encode_scenario() {
    let output = invoke(
        &[
            "mac",
            "encode",
            "--cid",
            "0x03",
            "--param",
            "data_rate=5",
            "--param",
            "tx_power=3",
            "--param",
            "channel_mask=0x0003",
            "--param",
            "channel_mask_control=0",
            "--param",
            "nb_trans=1",
        ],
        &compact(),
    )
    .unwrap();
    assert_eq!(output.text, "0353030001");
}

#[test]
fn test_mac_encode_missing_param() {
    let err = invoke(&["mac", "encode", "--cid", "3", "--param", "data_rate=5"], &Config::default()).unwrap_err();
    assert!(matches!(err, CliError::Mac(lorawan_mac::MacError::MissingParameter(_))));
}

#[test]
fn test_mac_decode_partial() {
    let output = invoke(&["--json", "mac", "decode", "05", "--direction", "down"], &Config::default()).unwrap();
    assert!(!output.complete);
    let value = json(&output);
    assert_eq!(value["records"].as_array().unwrap().len(), 0);
    assert_eq!(value["error"], "truncated payload for RXParamSetup: needed 4, has 0");
}

#[test]
fn test_config_file() {
    let path: PathBuf = std::env::temp_dir().join(format!("lpf-test-{}.yaml", std::process::id()));
    std::fs::write(&path, "output: json\ndefault_direction: uplink\n").unwrap();
    let config = Config::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let output = invoke(&["mac", "decode", "020501"], &config).unwrap();
    let value = json(&output);
    assert_eq!(value["records"][0]["name"], "LinkCheckReq");
    assert_eq!(value["records"][1]["name"], "RXParamSetupAns");
}
