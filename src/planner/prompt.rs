//! Prompt templates for the LLM planner

use super::schema::{DestinationRequest, ItineraryRequest};

pub const SYSTEM_PROMPT: &str = "You are a world-class travel planner who finds the best routes \
and travel information for each traveller. Always answer with a single JSON object and nothing else.";

/// Prompt asking for `count` distinct destinations
#[must_use]
pub fn destination_prompt(request: &DestinationRequest, count: u32, language: &str) -> String {
    format!(
        "You are a professional travel consultant.\n\
Recommend {count} travel destinations, each with a different appeal, based on the following user preferences.\n\
\n\
Preferences (JSON): {preferences}\n\
Travel dates: {duration}\n\
Budget per person: {budget}\n\
\n\
If no preferred destination is given, choose freely. Respect the companion type \
(for example fewer walking-heavy plans with parents, romantic places for couples) \
and stay within the budget.\n\
\n\
Return the result strictly in this JSON format:\n\
{{\"recommendations\": [{{\"destination\": string, \"country\": string, \"shortDescription\": string, \
\"reasonForRecommendation\": string, \"estimatedTotalCost\": string (total cost in the requested currency), \
\"flightSuggestion\": string, \"hotelSuggestion\": string}}]}}\n\
\n\
Write every text field in {language}.",
        preferences = request.preferences,
        duration = request.duration,
        budget = request.budget,
    )
}

/// Prompt asking for a day-by-day itinerary and notable attractions
#[must_use]
pub fn itinerary_prompt(request: &ItineraryRequest, language: &str) -> String {
    format!(
        "You are a professional travel planner.\n\
Create a detailed daily itinerary for a trip to {destination}.\n\
Travel dates: {duration}\n\
Consider the following preferences (JSON): {preferences}\n\
\n\
Plans must be realistic and cover every day of the trip.\n\
\n\
Return the result strictly in this JSON format:\n\
{{\"itinerary\": [{{\"day\": integer starting at 1, \"theme\": string, \"activities\": \
[{{\"time\": string (for example morning, afternoon, evening or 10:00), \"activity\": string, \"description\": string}}]}}], \
\"attractions\": [{{\"name\": string, \"description\": string}}]}}\n\
\n\
Write every text field in {language}.",
        destination = request.destination,
        duration = request.duration,
        preferences = request.preferences,
    )
}

/// Strip a Markdown code fence around a model answer, if any
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // the info string (`json`, `JSON`, ...) runs up to the first newline
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
