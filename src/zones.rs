//! World grid zone survey.
//!
//! A static reference table of major electricity zones. Only `IN-WE` and
//! `SE-SE4` are served live by the backend; every other zone renders a
//! typical fixed value (default 400 for unmapped codes). Zones are
//! surveyed sequentially, one row per zone.

use colored::Colorize;

use crate::api::ApiClient;
use crate::carbon;
use crate::notify;

/// A geographic electricity grid zone.
#[derive(Debug, Clone, Copy)]
pub struct Zone {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Reference table of surveyed zones. Known at build time, never mutated.
pub const ZONES: &[Zone] = &[
    // India
    Zone { code: "IN-WE", name: "India West (Mumbai)", lat: 19.0760, lng: 72.8777 },
    Zone { code: "IN-NO", name: "India North", lat: 28.7041, lng: 77.1025 },
    Zone { code: "IN-SO", name: "India South", lat: 13.0827, lng: 80.2707 },
    Zone { code: "IN-EA", name: "India East", lat: 22.5726, lng: 88.3639 },
    Zone { code: "IN-NE", name: "India Northeast", lat: 26.1445, lng: 91.7362 },
    // Sweden
    Zone { code: "SE-SE4", name: "Sweden Stockholm", lat: 59.3293, lng: 18.0686 },
    Zone { code: "SE-SE3", name: "Sweden South", lat: 55.6050, lng: 13.0038 },
    Zone { code: "SE-SE1", name: "Sweden North", lat: 63.8258, lng: 20.2630 },
    // Europe
    Zone { code: "DE", name: "Germany", lat: 52.5200, lng: 13.4050 },
    Zone { code: "FR", name: "France", lat: 48.8566, lng: 2.3522 },
    Zone { code: "GB", name: "United Kingdom", lat: 51.5074, lng: -0.1278 },
    Zone { code: "NO-NO1", name: "Norway Oslo", lat: 59.9139, lng: 10.7522 },
    Zone { code: "DK-DK1", name: "Denmark West", lat: 56.2639, lng: 9.5018 },
    // USA
    Zone { code: "US-CAL-CISO", name: "California", lat: 36.7783, lng: -119.4179 },
    Zone { code: "US-TEX-ERCO", name: "Texas", lat: 31.9686, lng: -99.9018 },
    Zone { code: "US-NY-NYIS", name: "New York", lat: 40.7128, lng: -74.0060 },
    // Asia-Pacific
    Zone { code: "JP-TK", name: "Japan Tokyo", lat: 35.6762, lng: 139.6503 },
    Zone { code: "AU-NSW", name: "Australia NSW", lat: -33.8688, lng: 151.2093 },
    Zone { code: "SG", name: "Singapore", lat: 1.3521, lng: 103.8198 },
    // South America
    Zone { code: "BR-CS", name: "Brazil Central", lat: -15.7801, lng: -47.9292 },
    // Africa
    Zone { code: "ZA", name: "South Africa", lat: -30.5595, lng: 22.9375 },
];

/// Typical carbon intensity for zones without live backend coverage.
pub fn typical_intensity(code: &str) -> Option<f64> {
    let value = match code {
        "IN-NO" => 700.0,
        "IN-SO" => 650.0,
        "IN-EA" => 750.0,
        "IN-NE" => 600.0,
        "SE-SE1" => 30.0,
        "SE-SE3" => 40.0,
        "DE" => 350.0,
        "FR" => 60.0,
        "GB" => 250.0,
        "NO-NO1" => 25.0,
        "DK-DK1" => 180.0,
        "US-CAL-CISO" => 280.0,
        "US-TEX-ERCO" => 450.0,
        "US-NY-NYIS" => 320.0,
        "JP-TK" => 480.0,
        "AU-NSW" => 650.0,
        "SG" => 520.0,
        "BR-CS" => 380.0,
        "ZA" => 880.0,
        _ => return None,
    };
    Some(value)
}

/// Fallback intensity for any unmapped zone code.
pub const UNMAPPED_INTENSITY: f64 = 400.0;

/// Simulated intensity for a zone code: the typical value, or 400.
pub fn simulated_intensity(code: &str) -> f64 {
    typical_intensity(code).unwrap_or(UNMAPPED_INTENSITY)
}

/// Whether the backend serves live data for this zone code.
pub fn is_live_zone(code: &str) -> bool {
    matches!(code, "IN-WE" | "SE-SE4")
}

/// One surveyed row: a zone plus its fetched-or-simulated intensity.
#[derive(Debug, Clone, Copy)]
pub struct ZoneReading {
    pub zone: Zone,
    pub intensity: f64,
    /// True when the value came from the live endpoint.
    pub live: bool,
}

/// Survey every zone sequentially.
///
/// Live zones hit the backend; a failed fetch falls back to the zone's
/// simulated value so the table never loses a row on a transient error.
pub fn survey(client: &ApiClient) -> Vec<ZoneReading> {
    ZONES
        .iter()
        .map(|&zone| {
            if is_live_zone(zone.code) {
                match client.carbon_intensity(zone.code) {
                    Ok(reading) => ZoneReading {
                        zone,
                        intensity: reading.carbon_intensity,
                        live: true,
                    },
                    Err(e) => {
                        notify::error(&format!("zone {}: {e:#}", zone.code));
                        ZoneReading {
                            zone,
                            intensity: simulated_intensity(zone.code),
                            live: false,
                        }
                    }
                }
            } else {
                ZoneReading {
                    zone,
                    intensity: simulated_intensity(zone.code),
                    live: false,
                }
            }
        })
        .collect()
}

/// Render the survey as table rows (pure; printing happens in [`run`]).
pub fn render_table(readings: &[ZoneReading]) -> Vec<String> {
    let mut lines = Vec::with_capacity(readings.len() + 2);
    lines.push(format!(
        "  {:<14} {:<24} {:>10}  {:<12} {}",
        "Zone", "Region", "gCO2/kWh", "Status", "Source"
    ));
    lines.push(format!("  {}", "-".repeat(72)));

    for r in readings {
        let status = carbon::classify(r.intensity);
        let source = if r.live { "live" } else { "typical" };
        lines.push(format!(
            "  {:<14} {:<24} {} {:<12} {}",
            r.zone.code,
            r.zone.name,
            status.paint(&format!("{:>10.1}", r.intensity)),
            status.paint(status.label()),
            source.dimmed(),
        ));
    }

    lines
}

/// `gridwatch zones` — survey and print the full table.
pub fn run(client: &ApiClient) -> anyhow::Result<()> {
    println!("{}", "World Grid Carbon Survey".bold().cyan());
    println!("{}", "=".repeat(74));

    let readings = survey(client);
    for line in render_table(&readings) {
        println!("{line}");
    }

    println!();
    println!(
        "  {}",
        "Live data: IN-WE, SE-SE4. Other zones show typical values.".dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_zone_defaults_to_400() {
        assert_eq!(simulated_intensity("XX-UNKNOWN"), 400.0);
        assert_eq!(simulated_intensity(""), 400.0);
    }

    #[test]
    fn mapped_zones_use_typical_values() {
        assert_eq!(simulated_intensity("SE-SE1"), 30.0);
        assert_eq!(simulated_intensity("ZA"), 880.0);
        assert_eq!(simulated_intensity("DE"), 350.0);
    }

    #[test]
    fn only_two_zones_are_live() {
        let live: Vec<&str> = ZONES
            .iter()
            .map(|z| z.code)
            .filter(|c| is_live_zone(c))
            .collect();
        assert_eq!(live, vec!["IN-WE", "SE-SE4"]);
    }

    #[test]
    fn zone_table_is_stable() {
        assert_eq!(ZONES.len(), 21);
        assert_eq!(ZONES[0].code, "IN-WE");
        // Every non-live zone has a typical value (no accidental 400s).
        for zone in ZONES.iter().filter(|z| !is_live_zone(z.code)) {
            assert!(
                typical_intensity(zone.code).is_some(),
                "zone {} missing a typical value",
                zone.code
            );
        }
    }

    #[test]
    fn render_table_has_one_row_per_reading() {
        let readings: Vec<ZoneReading> = ZONES
            .iter()
            .map(|&zone| ZoneReading {
                zone,
                intensity: simulated_intensity(zone.code),
                live: false,
            })
            .collect();
        let lines = render_table(&readings);
        assert_eq!(lines.len(), readings.len() + 2);
    }
}
