//! Build script for sid-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sid.toml and bakes it into the firmware as a constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sid_core::config::{IdleProfile, OperationMode, SidConfig, SmoothingPolicy, StrictSequence};
use sid_protocol::DmxLayout;

fn main() {
    setup_linker();
    let config = validate_config();
    write_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SidToml {
    #[serde(default)]
    operation: OperationSection,
    #[serde(default)]
    dmx: DmxSection,
    #[serde(default)]
    smoothing: SmoothingSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OperationSection {
    mode: u8,
    idle: u8,
    sequence: String,
}

impl Default for OperationSection {
    fn default() -> Self {
        Self {
            mode: SidConfig::DEFAULT.mode.index(),
            idle: 0,
            sequence: "full".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DmxSection {
    base_channel: u16,
    verify: bool,
}

impl Default for DmxSection {
    fn default() -> Self {
        Self {
            base_channel: SidConfig::DEFAULT.dmx.base_channel,
            verify: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SmoothingSection {
    procedural: PolicySection,
    table: PolicySection,
}

impl Default for SmoothingSection {
    fn default() -> Self {
        Self {
            procedural: SmoothingPolicy::PROCEDURAL.into(),
            table: SmoothingPolicy::TABLE.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicySection {
    max_step: u8,
    midpoint_above: u8,
}

impl From<SmoothingPolicy> for PolicySection {
    fn from(p: SmoothingPolicy) -> Self {
        Self {
            max_step: p.max_step,
            midpoint_above: p.midpoint_above,
        }
    }
}

/// Validate sid.toml at compile time
fn validate_config() -> SidConfig {
    println!("cargo:rerun-if-changed=sid.toml");

    let config_path = Path::new("sid.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sid.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a sid.toml configuration file.            ║\n\
            ║  Please create one in the sid-firmware directory.                ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sid.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let raw: SidToml = match toml::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid sid.toml                                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();

    let mode = OperationMode::from_index(raw.operation.mode);
    if mode.is_none() {
        errors.push(format!(
            "operation.mode = {} (expected 0-4)",
            raw.operation.mode
        ));
    }

    let idle = IdleProfile::from_index(raw.operation.idle);
    if idle.is_none() {
        errors.push(format!(
            "operation.idle = {} (expected 0-3)",
            raw.operation.idle
        ));
    }

    let sequence = match raw.operation.sequence.as_str() {
        "full" => Some(StrictSequence::Full),
        "canonical" => Some(StrictSequence::Canonical),
        other => {
            errors.push(format!(
                "operation.sequence = \"{}\" (expected \"full\" or \"canonical\")",
                other
            ));
            None
        }
    };

    let config = match (mode, idle, sequence) {
        (Some(mode), Some(idle), Some(sequence)) => {
            let config = SidConfig {
                mode,
                idle,
                sequence,
                dmx: DmxLayout::new(raw.dmx.base_channel, raw.dmx.verify),
                procedural_smoothing: SmoothingPolicy {
                    max_step: raw.smoothing.procedural.max_step,
                    midpoint_above: raw.smoothing.procedural.midpoint_above,
                },
                table_smoothing: SmoothingPolicy {
                    max_step: raw.smoothing.table.max_step,
                    midpoint_above: raw.smoothing.table.midpoint_above,
                },
            };
            if let Err(e) = config.validate() {
                errors.push(format!("{:?}", e));
            }
            Some(config)
        }
        _ => None,
    };

    match config {
        Some(config) if errors.is_empty() => {
            println!("cargo:warning=sid.toml validated successfully");
            config
        }
        _ => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in sid.toml                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit `sid_config.rs` for the firmware to `include!`
fn write_config(config: &SidConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "/// Fixture configuration baked from sid.toml\n\
        pub const SID_CONFIG: SidConfig = SidConfig {{\n    \
            mode: OperationMode::{:?},\n    \
            idle: IdleProfile::{:?},\n    \
            sequence: StrictSequence::{:?},\n    \
            dmx: DmxLayout::new({}, {}),\n    \
            procedural_smoothing: SmoothingPolicy {{ max_step: {}, midpoint_above: {} }},\n    \
            table_smoothing: SmoothingPolicy {{ max_step: {}, midpoint_above: {} }},\n\
        }};\n",
        config.mode,
        config.idle,
        config.sequence,
        config.dmx.base_channel,
        config.dmx.verify,
        config.procedural_smoothing.max_step,
        config.procedural_smoothing.midpoint_above,
        config.table_smoothing.max_step,
        config.table_smoothing.midpoint_above,
    );
    fs::write(out_dir.join("sid_config.rs"), source).unwrap();
}
