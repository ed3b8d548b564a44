use crate::night::{NightReport, NightlyBodySummary};
use crate::rating::ViewingLevel;
use crate::weather::WeatherOutlook;

/// Formats a night report into a human-readable observing plan
pub fn format_night_report(report: &NightReport) -> String {
    let mut output = format!(
        "Observing Plan for {}\nLocation: {} ({:.4}, {:.4}, {} m)\nEquipment: {}\n\n",
        report.date,
        report.location.name,
        report.location.latitude,
        report.location.longitude,
        report.location.elevation,
        report.viewing_capabilities.description
    );

    output.push_str(&format_weather(&report.weather));
    output.push('\n');

    if report.targets.is_empty() {
        output.push_str("No recommended targets for tonight.\n");
        return output;
    }

    for (title, targets) in [
        ("Excellent", &report.targets.excellent),
        ("Good", &report.targets.good),
        ("Fair", &report.targets.fair),
    ] {
        if targets.is_empty() {
            continue;
        }
        output.push_str(&format!("{} targets:\n\n", title));
        for target in targets {
            output.push_str(&format_target(target));
        }
    }
    output
}

/// Formats the weather section of a report
pub fn format_weather(weather: &WeatherOutlook) -> String {
    match weather {
        WeatherOutlook::Forecast(verdict) => {
            let mut output = format!(
                "Weather: {} ({})\n  Cloud cover: {}/9\n  Seeing: {}/8\n  Transparency: {}/8\n",
                verdict.quality.as_str(),
                if verdict.worth_observing {
                    "worth observing"
                } else {
                    "not worth observing"
                },
                verdict.avg_cloud_cover,
                verdict.avg_seeing,
                verdict.avg_transparency
            );
            if !verdict.reasons.is_empty() {
                output.push_str(&format!("  Notes: {}\n", verdict.reasons.join(", ")));
            }
            output
        }
        WeatherOutlook::Unavailable(unavailable) => {
            format!("Weather: {} ({})\n", unavailable.error, unavailable.message)
        }
        WeatherOutlook::NoData => "Weather: no forecast for the evening window\n".to_string(),
    }
}

fn format_target(target: &NightlyBodySummary) -> String {
    let mut output = format!(
        "{}:\n  Peak: {:02}:00 at {:.1}\u{00b0} altitude, {} ({:.1}\u{00b0})\n  Visible: {} of {} hours\n",
        target.name,
        target.peak_hour,
        target.peak_altitude,
        target.peak_direction,
        target.peak_azimuth,
        target.visible_hours,
        target.total_hours
    );
    if let Some(magnitude) = target.magnitude {
        output.push_str(&format!("  Magnitude: {:.1}\n", magnitude));
    }
    output.push_str(&format!(
        "  Constellation: {}\n  Distance: {}\n  Notes: {}\n\n",
        target.constellation, target.light_distance.string, target.reason
    ));
    output
}

/// Lists the available viewing levels and what each can resolve
pub fn format_viewing_levels() -> String {
    let mut output = String::from("Viewing levels:\n\n");
    for level in ViewingLevel::ALL {
        let caps = level.capabilities();
        output.push_str(&format!(
            "{}:\n  {}\n  Limiting magnitude: {:.0}\n  Minimum altitude: {:.0}\u{00b0}\n\n",
            level, caps.description, caps.max_magnitude, caps.min_altitude
        ));
    }
    output
}
