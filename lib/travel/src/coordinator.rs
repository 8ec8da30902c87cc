//! The request pipeline: safety gate, domain tools, reasoning, grounding.

use crate::advice::TravelAdvice;
use crate::config::AssistantConfig;
use crate::grounding::GroundingVerifier;
use crate::reasoning::{Findings, Reasoner};
use crate::safety::{Moderator, QueryGate};
use crate::store::DocumentIndex;
use crate::tools::SearchTools;
use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

async fn bounded<T>(what: &str, limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(what.to_string()))?
}

pub struct TravelAssistant {
    gate: QueryGate,
    tools: SearchTools,
    reasoner: Arc<dyn Reasoner>,
    verifier: GroundingVerifier,
    timeout: Duration,
}

impl TravelAssistant {
    pub fn new(
        index: Arc<dyn DocumentIndex>,
        moderator: Arc<dyn Moderator>,
        reasoner: Arc<dyn Reasoner>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            gate: QueryGate::new(moderator, config.timeout),
            tools: SearchTools::new(index.clone()).with_k(config.k),
            reasoner,
            verifier: GroundingVerifier::new(index, config.grounding),
            timeout: config.timeout,
        }
    }

    pub fn tools(&self) -> &SearchTools {
        &self.tools
    }

    /// Gather the three domain searches for a query that passed the gate
    pub async fn gather(&self, query: &str) -> Result<Findings> {
        let plan = self.reasoner.plan(query);
        let (hotels, flights, experiences) = tokio::try_join!(
            bounded("hotel search", self.timeout, self.tools.hotel_search(&plan.hotel)),
            bounded("flight search", self.timeout, self.tools.flight_search(&plan.flight)),
            bounded(
                "experience search",
                self.timeout,
                self.tools.experience_search(&plan.experience)
            ),
        )?;
        Ok(Findings {
            hotels,
            flights,
            experiences,
        })
    }

    /// Answer a travel query, or say why it cannot be answered
    pub async fn plan_trip(&self, query: &str) -> Result<TravelAdvice> {
        let verdict = self.gate.check(query).await?;
        if verdict.degraded {
            warn!("serving query without moderation");
        }

        let findings = self.gather(query).await?;
        let advice = bounded("reasoning", self.timeout, self.reasoner.advise(query, &findings)).await?;

        let report = self.verifier.check(&advice).await?;
        if !report.is_grounded() {
            warn!(failed = ?report.failures(), "rejecting ungrounded advice");
            return Err(Error::UngroundedRecommendation(report.failures().join(", ")));
        }

        info!(destination = %advice.destination, budget = %advice.budget, "planned trip");
        Ok(advice)
    }
}
