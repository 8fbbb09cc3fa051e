//! Text and JSON output.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use downlink_codec::{spaced, to_hex, DecodedFrame, EncodedFrame, FunctionType, Registry};
use lorawan_mac::MacDecodeResult;
use serde::Serialize;
use std::fmt::Write;

/// One row of `downlink list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    /// Function type key, e.g. `0x5_4`.
    pub function_type: String,
    /// Command key, e.g. `1_3`.
    pub command: String,
    /// Command name.
    pub name: &'static str,
    /// Schema kind tag.
    pub kind: &'static str,
    /// Data length in bytes.
    pub len: usize,
    /// Input upper bound.
    pub max: Option<f64>,
    /// Help text.
    pub description: Option<&'static str>,
}

/// Registry rows, optionally for one function type.
pub fn listing(registry: &Registry, only: Option<FunctionType>) -> Vec<ListingEntry> {
    registry
        .iter()
        .filter(|(ft, _)| only.map_or(true, |wanted| wanted == *ft))
        .map(|(ft, schema)| ListingEntry {
            function_type: ft.key().to_string(),
            command: schema.key().to_string(),
            name: schema.name,
            kind: schema.kind.tag(),
            len: schema.kind.len(),
            max: schema.max,
            description: schema.description,
        })
        .collect()
}

#[derive(Serialize)]
struct HexOutput<'a> {
    hex: &'a str,
}

/// Formats results according to the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    format: OutputFormat,
    spaced_hex: bool,
}

impl Renderer {
    /// Renderer with an explicit format and hex spacing.
    pub fn new(format: OutputFormat, spaced_hex: bool) -> Self {
        Renderer { format, spaced_hex }
    }

    /// Renderer for a resolved configuration.
    pub fn from_config(config: &Config) -> Self {
        Renderer::new(config.output, config.spaced_hex)
    }

    fn hex(&self, hex: &str) -> String {
        if self.spaced_hex {
            spaced(hex)
        } else {
            hex.to_string()
        }
    }

    fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// An encoded device frame with its breakdown.
    pub fn encoded(&self, frame: &EncodedFrame) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::json(frame);
        }
        let b = &frame.breakdown;
        let mut out = String::new();
        writeln!(out, "Hex:        {}", self.hex(&frame.hex))?;
        writeln!(out, "Header:     {}", self.hex(&b.header))?;
        writeln!(out, "Function:   {}", b.function_byte)?;
        if let Some(extra) = &b.extra_byte {
            writeln!(out, "Extra:      {}", extra)?;
        }
        writeln!(out, "Segment:    {}", b.segment_length)?;
        writeln!(out, "Command:    {}", b.command_id)?;
        if !b.data.is_empty() {
            writeln!(out, "Data:       {}", self.hex(&b.data))?;
        }
        write!(out, "Checksum:   {}", b.checksum)?;
        Ok(out)
    }

    /// A decoded device frame.
    pub fn decoded(&self, frame: &DecodedFrame) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::json(frame);
        }
        let mut out = String::new();
        writeln!(out, "Sequence:   {}", frame.header.sequence)?;
        writeln!(out, "Length:     {}", frame.header.payload_length)?;
        writeln!(
            out,
            "Function:   {} (0x{:02X})",
            frame.function_type.name(),
            frame.function_byte
        )?;
        writeln!(out, "Command:    {} ({})", frame.command_name, frame.command_id)?;
        if !frame.data.is_empty() {
            writeln!(out, "Data:       {}", self.hex(&to_hex(&frame.data)))?;
        }
        for field in &frame.fields {
            writeln!(out, "{:<11} {}", format!("{}:", field.name), field.value)?;
        }
        write!(out, "Checksum:   0x{:02X}", frame.checksum)?;
        Ok(out)
    }

    /// Registry listing.
    pub fn listing(&self, entries: &[ListingEntry]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::json(entries);
        }
        let lines: Vec<String> = entries
            .iter()
            .map(|e| {
                let mut line = format!("{:<6} {:<6} {:<24} {:<10} {}B", e.function_type, e.command, e.name, e.kind, e.len);
                if let Some(description) = e.description {
                    line.push_str("  ");
                    line.push_str(description);
                }
                line
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Hex produced by a MAC encode.
    pub fn mac_hex(&self, hex: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::json(&HexOutput { hex }),
            OutputFormat::Text => Ok(self.hex(hex)),
        }
    }

    /// Records of a MAC decode, followed by the error that stopped it.
    pub fn mac_decoded(&self, result: &MacDecodeResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Self::json(result);
        }
        let mut out = String::new();
        for record in &result.records {
            writeln!(
                out,
                "0x{:02X} {} [{}]",
                record.cid,
                record.name,
                self.hex(&to_hex(&record.raw))
            )?;
            for (name, value) in &record.params {
                writeln!(out, "  {}: {}", name, value)?;
            }
        }
        if let Some(err) = &result.error {
            writeln!(out, "error: {}", err)?;
        }
        Ok(out.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downlink_codec::{CommandKey, DownlinkCodec, DownlinkRequest, Target};
    use lorawan_mac::Direction;

    fn scenario_a() -> EncodedFrame {
        DownlinkCodec::standard()
            .encode(
                &DownlinkRequest::new(FunctionType::DigitalInput, CommandKey::new(2))
                    .target(Target::Channel { channel: 2 })
                    .sequence(5),
            )
            .unwrap()
    }

    #[test]
    fn test_encoded_text() {
        let text = Renderer::new(OutputFormat::Text, true).encoded(&scenario_a()).unwrap();
        assert!(text.starts_with("Hex:        80 05 04 02 01 02 00 BC\n"));
        assert!(text.contains("Header:     80 05 04"));
        assert!(text.ends_with("Checksum:   BC"));

        let text = Renderer::new(OutputFormat::Text, false).encoded(&scenario_a()).unwrap();
        assert!(text.starts_with("Hex:        80050402010200BC\n"));
    }

    #[test]
    fn test_encoded_json() {
        let json = Renderer::new(OutputFormat::Json, true).encoded(&scenario_a()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hex"], "80050402010200BC");
        assert_eq!(value["breakdown"]["checksum"], "BC");
    }

    #[test]
    fn test_decoded_text() {
        let frame = DownlinkCodec::standard().decode("80050402010200BC").unwrap();
        let text = Renderer::new(OutputFormat::Text, true).decoded(&frame).unwrap();
        assert!(text.contains("Function:   digital-input (0x02)"));
        assert!(text.contains("Command:    Clear Overflow (2)"));
        assert!(text.contains("Channel:"));
    }

    #[test]
    fn test_listing_filter() {
        let registry = Registry::standard();
        assert_eq!(listing(&registry, None).len(), registry.len());
        let rows = listing(&registry, Some(FunctionType::DeviceConfig));
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|r| r.function_type == "0x6"));
        assert!(rows.iter().any(|r| r.command == "1_3" && r.name == "Restart System"));
    }

    #[test]
    fn test_mac_text_keeps_partial_records() {
        let result = lorawan_mac::decode("0603530300", Direction::Downlink);
        let text = Renderer::new(OutputFormat::Text, false).mac_decoded(&result).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "0x06 DevStatusReq [06]");
        assert!(lines.last().unwrap().starts_with("error: truncated payload for LinkADR"));
    }

    #[test]
    fn test_mac_hex_json() {
        let json = Renderer::new(OutputFormat::Json, true).mac_hex("0353030001").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hex"], "0353030001");
    }

    #[test]
    fn test_text_writes_optional_lines() {
        let codec = DownlinkCodec::standard();
        let frame = codec
            .encode(
                &DownlinkRequest::new(FunctionType::SensorLowRange, CommandKey::new(5))
                    .value(downlink_codec::FieldValue::Scaled(12.345)),
            )
            .unwrap();
        let renderer = Renderer::new(OutputFormat::Text, false);
        let text = renderer.encoded(&frame).unwrap();
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("Extra:      00"));
        assert!(text.contains("Data:       39300000"));

        let decoded = codec.decode(&frame.hex).unwrap();
        let text = renderer.decoded(&decoded).unwrap();
        assert!(text.contains("Data:       39300000"));
        assert!(text.ends_with(&format!("Checksum:   0x{:02X}", decoded.checksum)));

        let result = lorawan_mac::decode("0353030001", Direction::Downlink);
        let text = renderer.mac_decoded(&result).unwrap();
        assert!(text.starts_with("0x03 LinkADRReq [0353030001]\n  "));
        assert!(!text.contains("error:"));
    }
}
