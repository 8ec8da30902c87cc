//! Post-hoc check that recommended entities exist in the collections.

use crate::advice::{Recommendation, TravelAdvice};
use crate::store::{DocumentIndex, DEFAULT_K};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// How absent recommendations count towards grounding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingPolicy {
    /// Every domain must carry a recommendation that is found again
    #[default]
    RequireAll,
    /// Only the recommendations that are present are looked up
    PresentOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainCheck {
    Missing,
    /// Not looked up because the outcome was already decided
    Skipped,
    Found { hits: usize },
    NotFound,
}

impl DomainCheck {
    fn passes(&self, policy: GroundingPolicy) -> bool {
        match self {
            DomainCheck::Found { .. } => true,
            DomainCheck::Missing => policy == GroundingPolicy::PresentOnly,
            DomainCheck::Skipped | DomainCheck::NotFound => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundingReport {
    pub policy: GroundingPolicy,
    pub hotel: DomainCheck,
    pub flight: DomainCheck,
    pub experience: DomainCheck,
}

impl GroundingReport {
    pub fn is_grounded(&self) -> bool {
        [self.hotel, self.flight, self.experience]
            .iter()
            .all(|check| check.passes(self.policy))
    }

    /// Domains that failed, for error messages
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("hotel", self.hotel),
            ("flight", self.flight),
            ("experience", self.experience),
        ]
        .into_iter()
        .filter(|(_, check)| !check.passes(self.policy))
        .map(|(name, _)| name)
        .collect()
    }
}

pub struct GroundingVerifier {
    index: Arc<dyn DocumentIndex>,
    policy: GroundingPolicy,
}

impl GroundingVerifier {
    pub fn new(index: Arc<dyn DocumentIndex>, policy: GroundingPolicy) -> Self {
        Self { index, policy }
    }

    pub fn policy(&self) -> GroundingPolicy {
        self.policy
    }

    async fn lookup<R: Recommendation>(&self, recommendation: Option<&R>) -> Result<DomainCheck> {
        let Some(recommendation) = recommendation else {
            return Ok(DomainCheck::Missing);
        };
        let query = recommendation.grounding_query();
        let hits = self.index.search(R::DOMAIN, &query, DEFAULT_K, None).await?;
        debug!(domain = %R::DOMAIN, query = %query, hits = hits.len(), "grounding lookup");

        Ok(if hits.is_empty() {
            DomainCheck::NotFound
        } else {
            DomainCheck::Found { hits: hits.len() }
        })
    }

    pub async fn check(&self, advice: &TravelAdvice) -> Result<GroundingReport> {
        let all_present =
            advice.hotel.is_some() && advice.flight.is_some() && advice.experience.is_some();

        if self.policy == GroundingPolicy::RequireAll && !all_present {
            let mark = |present: bool| {
                if present {
                    DomainCheck::Skipped
                } else {
                    DomainCheck::Missing
                }
            };
            return Ok(GroundingReport {
                policy: self.policy,
                hotel: mark(advice.hotel.is_some()),
                flight: mark(advice.flight.is_some()),
                experience: mark(advice.experience.is_some()),
            });
        }

        let (hotel, flight, experience) = tokio::try_join!(
            self.lookup(advice.hotel.as_ref()),
            self.lookup(advice.flight.as_ref()),
            self.lookup(advice.experience.as_ref()),
        )?;

        Ok(GroundingReport {
            policy: self.policy,
            hotel,
            flight,
            experience,
        })
    }

    /// True when the advice only names entities that exist in the collections
    pub async fn verify(&self, advice: &TravelAdvice) -> Result<bool> {
        let report = self.check(advice).await?;
        let grounded = report.is_grounded();
        if !grounded {
            warn!(failed = ?report.failures(), policy = ?self.policy, "advice is not grounded");
        }
        Ok(grounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{ExperienceRecommendation, FlightRecommendation, HotelRecommendation};
    use crate::domain::Domain;
    use crate::store::{Candidate, StoredDocument};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use wayfarer_core::PayloadFilter;

    /// Answers with one hit for every domain listed in `known`
    struct Lookup {
        known: Vec<Domain>,
        calls: Mutex<Vec<(Domain, String, usize)>>,
    }

    impl Lookup {
        fn new(known: Vec<Domain>) -> Arc<Self> {
            Arc::new(Self {
                known,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DocumentIndex for Lookup {
        async fn search_with_score(
            &self,
            domain: Domain,
            query: &str,
            k: usize,
            _filter: Option<&PayloadFilter>,
        ) -> Result<Vec<Candidate>> {
            self.calls.lock().push((domain, query.to_string(), k));
            if !self.known.contains(&domain) {
                return Ok(Vec::new());
            }
            Ok(vec![Candidate {
                document: StoredDocument {
                    id: "1".into(),
                    content: String::new(),
                    metadata: Default::default(),
                },
                score: 0.5,
            }])
        }
    }

    fn advice() -> TravelAdvice {
        TravelAdvice {
            destination: "London".into(),
            reason: "test".into(),
            budget: "Mid-range".into(),
            tips: vec![],
            hotel: Some(HotelRecommendation {
                name: "The Savoy".into(),
                city: "London".into(),
                price_per_night: 450.0,
                rating: 4.5,
            }),
            flight: Some(FlightRecommendation {
                airline: "Virgin Atlantic".into(),
                from_airport: "JFK".into(),
                to_airport: "LHR".into(),
                price: 500.0,
                duration: "7h".into(),
                date: "2024-07-01".into(),
            }),
            experience: Some(ExperienceRecommendation {
                name: "London Eye".into(),
                city: "London".into(),
                price: 50.0,
                duration: "2 hours".into(),
            }),
        }
    }

    #[tokio::test]
    async fn test_all_found_is_grounded() {
        let index = Lookup::new(Domain::ALL.to_vec());
        let verifier = GroundingVerifier::new(index.clone(), GroundingPolicy::RequireAll);

        assert!(verifier.verify(&advice()).await.unwrap());

        let calls = index.calls.lock();
        assert_eq!(calls.len(), 3);
        assert!(calls.contains(&(Domain::Hotel, "The Savoy London".to_string(), 5)));
        assert!(calls.contains(&(Domain::Flight, "Virgin Atlantic JFK LHR 2024-07-01".to_string(), 5)));
        assert!(calls.contains(&(Domain::Experience, "London Eye London".to_string(), 5)));
    }

    #[tokio::test]
    async fn test_missing_hotel_fails_without_lookups() {
        let index = Lookup::new(Domain::ALL.to_vec());
        let verifier = GroundingVerifier::new(index.clone(), GroundingPolicy::RequireAll);
        let mut advice = advice();
        advice.hotel = None;

        let report = verifier.check(&advice).await.unwrap();
        assert_eq!(report.hotel, DomainCheck::Missing);
        assert!(!report.is_grounded());
        assert_eq!(report.failures(), vec!["hotel", "flight", "experience"]);
        assert!(!verifier.verify(&advice).await.unwrap());
        assert!(index.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entity_fails() {
        let index = Lookup::new(vec![Domain::Hotel, Domain::Experience]);
        let verifier = GroundingVerifier::new(index, GroundingPolicy::RequireAll);

        let report = verifier.check(&advice()).await.unwrap();
        assert_eq!(report.flight, DomainCheck::NotFound);
        assert_eq!(report.failures(), vec!["flight"]);
    }

    #[tokio::test]
    async fn test_present_only_ignores_missing() {
        let index = Lookup::new(Domain::ALL.to_vec());
        let verifier = GroundingVerifier::new(index.clone(), GroundingPolicy::PresentOnly);
        let mut advice = advice();
        advice.flight = None;

        assert!(verifier.verify(&advice).await.unwrap());
        assert_eq!(index.calls.lock().len(), 2);
    }
}
