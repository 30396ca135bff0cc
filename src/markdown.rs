//! Flight options rendered as a Markdown document with an embedded HTML table

use askama::Template;

use crate::flights::{AirportStop, CarbonEmissions, FlightOption, FlightPayload, FlightSegment};
use crate::parser::{AirportCode, ParseError};

const HEADING: &str = "## ✈️ Flight Information";
const NOT_AVAILABLE: &str = "N/A";

/// Returned when the model produced a payload without any option
pub const NO_FLIGHTS_MESSAGE: &str = "## ✈️ Flight Information\n\nNo flights found for this route and date.\n\nPlease try different dates or destinations.";

/// `{h}h {m}m`
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// "Nonstop", "1 stop", "2 stops"
#[must_use]
pub fn format_stops(stops: usize) -> String {
    match stops {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

/// Message shown in place of flight options when the model output could not be used
#[must_use]
pub fn format_flight_error(error: &ParseError) -> String {
    format!("{HEADING}\n\n{error}\n\nPlease try again later or check your airport codes.")
}

/// Message shown when the model could not be reached for flight data
#[must_use]
pub fn format_flight_unavailable() -> String {
    format!("{HEADING}\n\nUnable to retrieve flight details at this time.\n\nPlease try again later.")
}

#[derive(Template)]
#[template(path = "flight_options.md", escape = "html")]
struct FlightOptionsTemplate<'a> {
    source: &'a AirportCode,
    destination: &'a AirportCode,
    route_differs: bool,
    booking_url: &'a str,
    options: Vec<OptionView>,
}

struct OptionView {
    number: usize,
    airline: String,
    price: String,
    duration: String,
    departure: String,
    arrival: String,
    stops: String,
    segments: Vec<SegmentView>,
    layovers: Vec<LayoverView>,
    emissions: Option<String>,
}

struct SegmentView {
    number: usize,
    from: String,
    to: String,
    flight: String,
    depart_name: String,
    depart_time: String,
    arrive_name: String,
    arrive_time: String,
    duration: String,
    aircraft: String,
    overnight: bool,
}

struct LayoverView {
    name: String,
    id: String,
    duration: String,
}

/// Render up to `max_options` flight options for the requested route.
///
/// Options keep their input order. One table row and one "Option N" section is
/// written per option; absent values render as `N/A`. All model text goes
/// through the template's HTML escaping.
pub fn format_flight_options(
    payload: &FlightPayload,
    source: &AirportCode,
    destination: &AirportCode,
    booking_url: &str,
    max_options: usize,
) -> Result<String, askama::Error> {
    let options: Vec<&FlightOption> = payload.best_flights.iter().take(max_options).collect();
    let Some(first) = options.first() else {
        return Ok(NO_FLIGHTS_MESSAGE.to_string());
    };

    FlightOptionsTemplate {
        source,
        destination,
        route_differs: route_differs(first, source, destination),
        booking_url,
        options: options
            .iter()
            .enumerate()
            .map(|(index, option)| option_view(index + 1, option))
            .collect(),
    }
    .render()
}

/// Whether the model answered for a different route than the one requested
fn route_differs(first: &FlightOption, source: &AirportCode, destination: &AirportCode) -> bool {
    let actual_source = first.first_departure().and_then(|a| a.id.as_deref());
    let actual_destination = first.last_arrival().and_then(|a| a.id.as_deref());

    match (actual_source, actual_destination) {
        (Some(from), Some(to)) => source != from || destination != to,
        _ => false,
    }
}

fn option_view(number: usize, option: &FlightOption) -> OptionView {
    OptionView {
        number,
        airline: or_na(option.airline.as_deref()).to_string(),
        price: price_label(option),
        duration: minutes_label(option.total_duration),
        departure: stop_label(option.first_departure()),
        arrival: stop_label(option.last_arrival()),
        stops: format_stops(option.stops()),
        segments: option
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| segment_view(index + 1, segment))
            .collect(),
        layovers: option
            .layovers
            .iter()
            .map(|layover| LayoverView {
                name: or_na(layover.name.as_deref()).to_string(),
                id: or_na(layover.id.as_deref()).to_string(),
                duration: minutes_label(layover.duration),
            })
            .collect(),
        emissions: option.carbon_emissions.as_ref().map(emissions_label),
    }
}

fn segment_view(number: usize, segment: &FlightSegment) -> SegmentView {
    let departure = &segment.departure_airport;
    let arrival = &segment.arrival_airport;
    let flight = match (&segment.airline, &segment.flight_number) {
        (Some(airline), Some(number)) => format!("{airline} {number}"),
        (Some(airline), None) => airline.clone(),
        (None, Some(number)) => number.clone(),
        (None, None) => NOT_AVAILABLE.to_string(),
    };

    SegmentView {
        number,
        from: or_na(departure.id.as_deref()).to_string(),
        to: or_na(arrival.id.as_deref()).to_string(),
        flight,
        depart_name: or_na(departure.name.as_deref()).to_string(),
        depart_time: or_na(departure.clock_time()).to_string(),
        arrive_name: or_na(arrival.name.as_deref()).to_string(),
        arrive_time: or_na(arrival.clock_time()).to_string(),
        duration: minutes_label(segment.duration),
        aircraft: or_na(segment.airplane.as_deref()).to_string(),
        overnight: segment.overnight,
    }
}

/// `412.0 kg (12% lower than average)`
fn emissions_label(carbon: &CarbonEmissions) -> String {
    let kilograms = carbon
        .this_flight
        .map_or_else(|| NOT_AVAILABLE.to_string(), |grams| format!("{:.1} kg", grams / 1000.0));
    let comparison = match carbon.difference_percent {
        Some(diff) if diff < 0.0 => format!("{}% lower than average", diff.abs()),
        Some(diff) if diff > 0.0 => format!("{diff}% higher than average"),
        Some(_) => "same as average".to_string(),
        None => "no comparison available".to_string(),
    };
    format!("{kilograms} ({comparison})")
}

fn minutes_label(minutes: Option<u32>) -> String {
    minutes.map_or_else(|| NOT_AVAILABLE.to_string(), format_duration)
}

fn price_label(option: &FlightOption) -> String {
    option
        .price
        .as_ref()
        .map_or_else(|| NOT_AVAILABLE.to_string(), |price| format!("${price}"))
}

fn stop_label(stop: Option<&AirportStop>) -> String {
    let time = stop.and_then(AirportStop::clock_time).unwrap_or(NOT_AVAILABLE);
    let id = stop.and_then(|s| s.id.as_deref()).unwrap_or(NOT_AVAILABLE);
    format!("{time} ({id})")
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://www.google.com/travel/flights?q=x&dates=2025-06-10";

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn payload(value: serde_json::Value) -> FlightPayload {
        serde_json::from_value(value).unwrap()
    }

    fn direct_option(airline: &str, price: &str, from: &str, to: &str) -> serde_json::Value {
        json!({
            "airline": airline,
            "price": price,
            "total_duration": 425,
            "flights": [{
                "departure_airport": {"id": from, "name": "Origin Intl", "time": "2025-06-10 08:15"},
                "arrival_airport": {"id": to, "name": "Destination Intl", "time": "15:20"},
                "airline": airline,
                "flight_number": "XX100",
                "duration": 425,
                "airplane": "Airbus A350"
            }]
        })
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_format_duration_and_stops() {
        assert_eq!(format_duration(425), "7h 5m");
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_stops(0), "Nonstop");
        assert_eq!(format_stops(1), "1 stop");
        assert_eq!(format_stops(2), "2 stops");
    }

    #[test]
    fn test_zero_options_yields_no_flights_message() {
        let rendered = format_flight_options(
            &FlightPayload::default(),
            &code("JFK"),
            &code("CDG"),
            URL,
            3,
        )
        .unwrap();
        assert_eq!(rendered, NO_FLIGHTS_MESSAGE);
    }

    #[test]
    fn test_single_nonstop_option() {
        let data = payload(json!({"best_flights": [direct_option("Air France", "812", "JFK", "CDG")]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert_eq!(count(&rendered, "<tr>\n<td>"), 1);
        assert!(!rendered.contains("Layovers"));
        assert!(rendered.contains("**From**: JFK to **CDG**"));
        assert!(!rendered.contains("Requested Route"));
        assert!(rendered.contains("<td>Air France</td>"));
        assert!(rendered.contains("<td>$812</td>"));
        assert!(rendered.contains("<td>7h 5m</td>"));
        assert!(rendered.contains("<td>08:15 (JFK)</td>"));
        assert!(rendered.contains("<td>15:20 (CDG)</td>"));
        assert!(rendered.contains("<td>Nonstop</td>"));
        assert!(rendered.contains("#### Option 1: $812"));
        assert!(rendered.contains("* Air France XX100"));
        assert!(rendered.contains("* Depart: Origin Intl at 08:15"));
        assert!(rendered.contains("* Aircraft: Airbus A350"));
    }

    #[test]
    fn test_three_options_keep_input_order() {
        let data = payload(json!({"best_flights": [
            direct_option("Delta", "900", "JFK", "CDG"),
            direct_option("United", "750", "JFK", "CDG"),
            direct_option("Air France", "812", "JFK", "CDG"),
            direct_option("Extra", "1", "JFK", "CDG")
        ]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert_eq!(count(&rendered, "<tr>\n<td>"), 3);
        assert_eq!(count(&rendered, "#### Option "), 3);
        assert!(!rendered.contains("Extra"));

        let first = rendered.find("#### Option 1: $900").unwrap();
        let second = rendered.find("#### Option 2: $750").unwrap();
        let third = rendered.find("#### Option 3: $812").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_route_mismatch_emits_disclaimer() {
        let data = payload(json!({"best_flights": [direct_option("Delta", "900", "LGA", "ORY")]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert!(rendered.contains("**Requested Route**: JFK to CDG"));
        assert!(rendered.contains("*Note: Showing sample flight data for demonstration purposes.*"));
        assert!(!rendered.contains("**From**"));
    }

    #[test]
    fn test_connecting_option_with_layovers_and_emissions() {
        let data = payload(json!({"best_flights": [{
            "airline": "Lufthansa",
            "price": 640,
            "total_duration": 610,
            "flights": [
                {"departure_airport": {"id": "JFK", "time": "18:00"}, "arrival_airport": {"id": "FRA", "time": "07:40"}, "overnight": true},
                {"departure_airport": {"id": "FRA", "time": "09:10"}, "arrival_airport": {"id": "CDG", "time": "10:25"}}
            ],
            "layovers": [{"id": "FRA", "name": "Frankfurt Airport", "duration": 90}],
            "carbon_emissions": {"this_flight": 412000, "difference_percent": -12}
        }]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert!(rendered.contains("<td>1 stop</td>"));
        assert!(rendered.contains("<td>$640</td>"));
        assert!(rendered.contains("* **Overnight flight**"));
        assert!(rendered.contains("**Layovers**:\n* Frankfurt Airport (FRA): 1h 30m"));
        assert!(rendered.contains("**Carbon Emissions**: 412.0 kg (12% lower than average)"));
        assert!(rendered.contains("**Segment 2**: FRA → CDG"));
        assert!(rendered.contains("* Aircraft: N/A"));
    }

    #[test]
    fn test_missing_fields_render_as_na() {
        let data = payload(json!({"best_flights": [{}]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert_eq!(count(&rendered, "<tr>\n<td>"), 1);
        assert!(rendered.contains("<td>N/A</td>\n<td>N/A</td>\n<td>N/A</td>"));
        assert!(rendered.contains("<td>N/A (N/A)</td>"));
        assert!(rendered.contains("#### Option 1: N/A"));
    }

    #[test]
    fn test_table_escapes_model_text_and_link() {
        let data = payload(json!({"best_flights": [direct_option("<script>x</script>", "1", "JFK", "CDG")]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert!(rendered.contains("<td>&lt;script&gt;x&lt;/script&gt;</td>"));
        assert!(rendered.contains("&amp;dates=2025-06-10' target='_blank'>Book</a>"));
        assert!(!rendered.contains("<script>"));
    }

    #[test]
    fn test_detail_section_escapes_model_text() {
        let data = payload(json!({"best_flights": [{
            "price": "<b>9</b>",
            "flights": [{
                "departure_airport": {"id": "JFK", "name": "<script>s</script>"},
                "arrival_airport": {"id": "CDG", "name": "Charles de Gaulle"},
                "airline": "<img src=x onerror=alert(1)>",
                "airplane": "<i>747</i>"
            }],
            "layovers": [{"id": "ORD", "name": "<iframe>"}]
        }]}));
        let rendered = format_flight_options(&data, &code("JFK"), &code("CDG"), URL, 3).unwrap();

        assert!(rendered.contains("* &lt;img src=x onerror=alert(1)&gt;"));
        assert!(rendered.contains("* Depart: &lt;script&gt;s&lt;/script&gt; at N/A"));
        assert!(rendered.contains("* Aircraft: &lt;i&gt;747&lt;/i&gt;"));
        assert!(rendered.contains("* &lt;iframe&gt; (ORD): N/A"));
        assert!(rendered.contains("#### Option 1: $&lt;b&gt;9&lt;/b&gt;"));
        for tag in ["<img", "<script>", "<i>", "<iframe>", "<b>"] {
            assert!(!rendered.contains(tag), "unescaped {tag}");
        }
    }

    #[test]
    fn test_flight_error_message() {
        let rendered = format_flight_error(&ParseError::NoJson);
        assert!(rendered.starts_with("## ✈️ Flight Information"));
        assert!(rendered.contains("Unable to retrieve flight data in the correct format"));
    }
}
