//! Build script for qems-firmware
//!
//! Validates the embedded qems.toml at compile time

use std::fs;
use std::path::Path;

fn main() {
    validate_config();
}

/// Validate qems.toml configuration at compile time
fn validate_config() {
    // Re-run if qems.toml changes
    println!("cargo:rerun-if-changed=qems.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("qems.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read qems.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in qems.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_metrics(&config, &mut errors);
    validate_schedule(&config, &mut errors);
    validate_clock(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in qems.toml                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
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

/// Validate the [metric.*] sections
fn validate_metrics(config: &toml::Value, errors: &mut Vec<String>) {
    let metrics = match config.get("metric") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[metric] must contain [metric.co2] and [metric.cost]".into());
            return;
        }
        None => return,
    };

    for (name, metric) in metrics {
        if name != "co2" && name != "cost" {
            errors.push(format!("[metric.{}] unknown metric, use co2 or cost", name));
            continue;
        }

        if let Some(source) = metric.get("source") {
            match source.as_str() {
                Some(path) if path.len() > 32 => {
                    errors.push(format!("[metric.{}] source longer than 32 chars", name))
                }
                Some(path) if !path.starts_with('/') => {
                    errors.push(format!("[metric.{}] source must start with '/'", name))
                }
                Some(_) => {}
                None => errors.push(format!("[metric.{}] source must be a string", name)),
            }
        }

        if let Some(lookup) = metric.get("lookup") {
            if !matches!(lookup.as_str(), Some("skip_first" | "first_future")) {
                errors.push(format!(
                    "[metric.{}] lookup must be 'skip_first' or 'first_future'",
                    name
                ));
            }
        }
    }
}

/// Validate the [schedule] section
fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(schedule) = config.get("schedule") else {
        return;
    };

    for key in ["render_interval_ms", "reload_interval_ms"] {
        if let Some(value) = schedule.get(key) {
            match value.as_integer() {
                Some(ms) if ms > 0 && ms <= i64::from(u32::MAX) => {}
                _ => errors.push(format!("[schedule] {} must be a positive integer", key)),
            }
        }
    }

    if let Some(value) = schedule.get("settle_ms") {
        if !matches!(value.as_integer(), Some(ms) if ms >= 0 && ms <= i64::from(u32::MAX)) {
            errors.push("[schedule] settle_ms must be a non-negative integer".into());
        }
    }
}

/// Validate the [clock] section
fn validate_clock(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(clock) = config.get("clock") else {
        return;
    };

    if let Some(server) = clock.get("ntp_server") {
        if !matches!(server.as_str(), Some(s) if !s.is_empty() && s.len() <= 32) {
            errors.push("[clock] ntp_server must be a host name of up to 32 chars".into());
        }
    }

    for key in ["gmt_offset_s", "dst_offset_s"] {
        if let Some(value) = clock.get(key) {
            match value.as_integer() {
                Some(s) if s.abs() <= 14 * 3600 => {}
                _ => errors.push(format!("[clock] {} must be within +-14 h", key)),
            }
        }
    }
}
