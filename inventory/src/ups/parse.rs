//! Response parsing for the NUT line protocol.

use std::collections::HashMap;

use crate::sources::UpsVariables;

/// A response is complete once the list terminator or an error appears
pub fn is_complete(response: &str) -> bool {
    response.contains("END LIST") || response.starts_with("ERR ")
}

/// Error text when the daemon rejected the command
pub fn error_reply(response: &str) -> Option<&str> {
    response
        .strip_prefix("ERR ")
        .map(|detail| detail.lines().next().unwrap_or(detail).trim())
}

pub fn split_lines(response: &str) -> Vec<&str> {
    response
        .trim()
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect()
}

/// `UPS <name> "<description>"`
pub fn parse_devices(lines: &[&str]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter(|line| line.starts_with("UPS "))
        .filter_map(|line| {
            let mut parts = line.splitn(3, ' ');
            parts.next();
            let name = parts.next().filter(|name| !name.is_empty())?;
            let description = parts.next().map(|d| d.trim_matches('"')).unwrap_or("");
            Some((name.to_string(), description.to_string()))
        })
        .collect()
}

/// `VAR <device> <key> "<value>"`
pub fn parse_variables(lines: &[&str]) -> HashMap<String, String> {
    lines
        .iter()
        .filter(|line| line.starts_with("VAR "))
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(4, ' ').collect();
            if parts.len() < 4 {
                return None;
            }
            Some((parts[2].to_string(), parts[3].trim_matches('"').to_string()))
        })
        .collect()
}

/// `CLIENT <device> <ip>`
pub fn parse_clients(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("CLIENT "))
        .filter_map(|line| line.split(' ').nth(2))
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn safe_float(value: Option<&String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Integers are accepted in float form (`"1200.0"`)
pub fn safe_int(value: Option<&String>) -> Option<i64> {
    safe_float(value)
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

pub fn variables_from_map(variables: &HashMap<String, String>) -> UpsVariables {
    UpsVariables {
        model: variables.get("ups.model").cloned(),
        battery_charge: safe_float(variables.get("battery.charge")),
        battery_runtime: safe_int(variables.get("battery.runtime")),
        ups_load: safe_float(variables.get("ups.load")),
        ups_status: variables.get("ups.status").cloned(),
        ups_temperature: safe_float(variables.get("ups.temperature")),
        input_voltage: safe_float(variables.get("input.voltage")),
        output_voltage: safe_float(variables.get("output.voltage")),
    }
}
