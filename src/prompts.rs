//! Prompt templates
//!
//! One pure function per model task. The only branching is whether a
//! resolved airport code is appended to a place name.

use chrono::NaiveDate;

use crate::models::{RecommendationRequest, TravelRequest, join_interests};
use crate::parser::AirportCode;

fn with_code(place: &str, code: Option<&AirportCode>) -> String {
    match code {
        Some(code) => format!("{place} ({code})"),
        None => place.to_string(),
    }
}

/// Day-by-day itinerary request
#[must_use]
pub fn itinerary_prompt(
    request: &TravelRequest,
    source_code: Option<&AirportCode>,
    destination_code: Option<&AirportCode>,
) -> String {
    format!(
        "Act as an expert travel planner. Create a detailed travel itinerary with the following information:

- Source: {source}
- Destination: {destination}
- Travel Dates: {dates}
- Budget: {budget}
- Number of Travelers: {travelers}
- Interests: {interests}

Please include:
1. A day-by-day itinerary with activities and attractions
2. Estimated costs for accommodations, food, transportation, and activities
3. Recommended places to stay within the budget
4. Local transportation options
5. Must-try local food and restaurants
6. Tips for the destination considering the interests provided
7. Any special considerations based on the travel dates (seasonal events, weather, etc.)

Format your response in Markdown with proper headings (using # for main headings, ## for subheadings),
bullet points, and emphasis where appropriate. Make it visually structured and easy to read.
",
        source = with_code(&request.source, source_code),
        destination = with_code(&request.destination, destination_code),
        dates = request.dates,
        budget = request.budget,
        travelers = request.travelers,
        interests = join_interests(&request.interests),
    )
}

/// IATA code lookup for a free-text location
#[must_use]
pub fn airport_code_prompt(location: &str) -> String {
    format!(
        "Convert the following location to its primary international airport's IATA code:
Location: {location}

Respond with ONLY the 3-letter IATA airport code in uppercase. If there are multiple major airports,
provide the code for the most commonly used international airport. If you cannot determine the airport code
with confidence, respond with \"UNKNOWN\".
"
    )
}

/// Five destination suggestions matching the traveller's preferences
#[must_use]
pub fn recommendation_prompt(request: &RecommendationRequest) -> String {
    format!(
        "Act as a travel destination expert. Recommend 5 destinations that would be perfect for a traveler with the following preferences:

- Interests: {interests}
- Budget: {budget}
- Travel Dates: {dates}
- Number of Travelers: {travelers}

For each destination, provide:
1. Why it's a good match for the interests
2. Typical costs and how they align with the budget
3. Weather and conditions during the specified dates
4. Top 3 attractions or activities related to the interests

Format your response in Markdown with proper headings (using # for main headings, ## for subheadings),
bullet points, and emphasis where appropriate. Make it visually structured and easy to read.
",
        interests = join_interests(&request.interests),
        budget = request.budget,
        dates = request.dates,
        travelers = request.travelers,
    )
}

/// Synthetic flight options as JSON
#[must_use]
pub fn flight_details_prompt(
    source: &AirportCode,
    destination: &AirportCode,
    date: NaiveDate,
    booking_url: &str,
) -> String {
    let date = date.format("%Y-%m-%d");
    format!(
        r#"Generate realistic flight information for a flight from {source} to {destination} on {date}.

Include the following details for 3 flight options:
1. Airline name
2. Price (in USD)
3. Duration
4. Departure time
5. Arrival time
6. Number of stops

Format the response as JSON with this structure:
{{
  "best_flights": [
    {{
      "airline": "Airline Name",
      "price": "1234",
      "total_duration": 360,
      "flights": [
        {{
          "departure_airport": {{"id": "{source}", "name": "Source Airport", "time": "10:00"}},
          "arrival_airport": {{"id": "{destination}", "name": "Destination Airport", "time": "14:00"}},
          "airline": "Airline Name",
          "flight_number": "AB123",
          "duration": 240,
          "airplane": "Boeing 737",
          "overnight": false
        }}
      ],
      "layovers": [],
      "carbon_emissions": {{"this_flight": 250000, "difference_percent": -5}}
    }}
  ],
  "search_metadata": {{
    "google_flights_url": "{booking_url}"
  }}
}}

Make the data realistic but varied between the 3 options. Include both direct and connecting flights.
Durations are in minutes. Respond with the JSON only.
"#
    )
}
