//! The reasoning seam: turning domain findings into advice.

use crate::advice::{
    ExperienceRecommendation, FlightRecommendation, HotelRecommendation, Recommendation,
    TravelAdvice,
};
use crate::selection::select;
use crate::tools::{DomainSearchResult, ExperienceSearch, FlightSearch, HotelSearch};
use crate::Result;
use async_trait::async_trait;

pub const MAX_TIPS: usize = 3;
const BUDGET_LIMIT: f64 = 200.0;
const MID_RANGE_LIMIT: f64 = 500.0;

/// Tool calls to make for one query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub hotel: HotelSearch,
    pub flight: FlightSearch,
    pub experience: ExperienceSearch,
}

impl SearchPlan {
    /// Send the query unchanged to all three tools
    pub fn passthrough(query: &str) -> Self {
        Self {
            hotel: HotelSearch::new(query),
            flight: FlightSearch::new(query),
            experience: ExperienceSearch::new(query),
        }
    }
}

/// What the three tools returned
#[derive(Debug, Clone)]
pub struct Findings {
    pub hotels: DomainSearchResult,
    pub flights: DomainSearchResult,
    pub experiences: DomainSearchResult,
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    fn plan(&self, query: &str) -> SearchPlan {
        SearchPlan::passthrough(query)
    }

    /// Assemble advice; recommendations must be copied from the findings
    async fn advise(&self, query: &str, findings: &Findings) -> Result<TravelAdvice>;
}

/// Deterministic reasoner: best candidate per domain, templated prose
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyReasoner;

/// `Budget` under 200, `Mid-range` under 500, `Luxury` otherwise
pub fn budget_tier(prices: &[f64]) -> &'static str {
    if prices.is_empty() {
        return "Flexible";
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    if mean < BUDGET_LIMIT {
        "Budget"
    } else if mean < MID_RANGE_LIMIT {
        "Mid-range"
    } else {
        "Luxury"
    }
}

fn destination(
    hotel: Option<&HotelRecommendation>,
    flight: Option<&FlightRecommendation>,
    experience: Option<&ExperienceRecommendation>,
) -> String {
    hotel
        .map(|h| h.city.clone())
        .or_else(|| experience.map(|e| e.city.clone()))
        .or_else(|| flight.map(|f| f.to_airport.clone()))
        .unwrap_or_else(|| "Undecided".to_string())
}

fn tips(
    hotel: Option<&HotelRecommendation>,
    flight: Option<&FlightRecommendation>,
    experience: Option<&ExperienceRecommendation>,
) -> Vec<String> {
    let mut tips = Vec::with_capacity(MAX_TIPS);
    if let Some(f) = flight {
        tips.push(format!(
            "Book the {} flight from {} to {} on {} early; it takes {}.",
            f.airline, f.from_airport, f.to_airport, f.date, f.duration
        ));
    }
    if let Some(h) = hotel {
        tips.push(format!(
            "{} in {} is rated {} stars; reserve ahead for the best rate.",
            h.name, h.city, h.rating
        ));
    }
    if let Some(e) = experience {
        tips.push(format!(
            "Set aside {} for {} in {}.",
            e.duration, e.name, e.city
        ));
    }
    tips.truncate(MAX_TIPS);
    tips
}

fn reason(query: &str, findings: &Findings, chosen: usize) -> String {
    let considered = findings.hotels.candidates.len()
        + findings.flights.candidates.len()
        + findings.experiences.candidates.len();
    if chosen == 0 {
        return format!("No options in the catalogue matched \"{}\".", query.trim());
    }
    format!(
        "Picked the closest match in each category for \"{}\" out of {} candidate options.",
        query.trim(),
        considered
    )
}

#[async_trait]
impl Reasoner for PolicyReasoner {
    async fn advise(&self, query: &str, findings: &Findings) -> Result<TravelAdvice> {
        let hotel: Option<HotelRecommendation> = select(&findings.hotels.candidates)?;
        let flight: Option<FlightRecommendation> = select(&findings.flights.candidates)?;
        let experience: Option<ExperienceRecommendation> = select(&findings.experiences.candidates)?;

        let mut prices = Vec::new();
        prices.extend(hotel.as_ref().map(|h| h.price()));
        prices.extend(flight.as_ref().map(|f| f.price()));
        prices.extend(experience.as_ref().map(|e| e.price()));

        Ok(TravelAdvice {
            destination: destination(hotel.as_ref(), flight.as_ref(), experience.as_ref()),
            reason: reason(query, findings, prices.len()),
            budget: budget_tier(&prices).to_string(),
            tips: tips(hotel.as_ref(), flight.as_ref(), experience.as_ref()),
            hotel,
            flight,
            experience,
        })
    }
}
