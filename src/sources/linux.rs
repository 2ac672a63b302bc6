// Linux-specific helpers: /sys battery and interface state.

/// Read battery charge from /sys/class/power_supply/BAT*/capacity (Linux).
/// None when the host has no battery.
pub(super) fn read_battery_pct() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with("BAT") {
                continue;
            }
            let capacity = entry.path().join("capacity");
            if let Ok(content) = std::fs::read_to_string(&capacity)
                && let Ok(pct) = content.trim().parse::<f64>()
            {
                return Some(pct.clamp(0.0, 100.0));
            }
        }
    }
    None
}

/// Read link state from /sys/class/net/<interface>/operstate (Linux).
pub(super) fn read_interface_up(interface_name: &str) -> Option<bool> {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/operstate", interface_name);
        let content = std::fs::read_to_string(&path).ok()?;
        return Some(content.trim() == "up");
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        None
    }
}
