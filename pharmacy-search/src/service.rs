use crate::aggregator::{aggregate, PharmacyGroup};
use crate::error::SearchResult;
use crate::query::Query;
use crate::ranker::rank;
use crate::resolver::{MedicineResolver, Resolution};
use config_engine::{EngineConfig, QueryLimitSettings};
use database_layer::CatalogStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one search. Empty outcomes are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one pharmacy stocks at least one resolved medicine
    Available {
        raw: String,
        resolution: Resolution,
        groups: Vec<PharmacyGroup>,
    },
    /// No token resolved to a known medicine
    NoResolvedMedicines { raw: String, resolution: Resolution },
    /// Medicines resolved but no pharmacy stocks any of them
    NoAvailability { raw: String, resolution: Resolution },
}

impl SearchOutcome {
    pub fn raw(&self) -> &str {
        match self {
            SearchOutcome::Available { raw, .. }
            | SearchOutcome::NoResolvedMedicines { raw, .. }
            | SearchOutcome::NoAvailability { raw, .. } => raw,
        }
    }

    pub fn resolution(&self) -> &Resolution {
        match self {
            SearchOutcome::Available { resolution, .. }
            | SearchOutcome::NoResolvedMedicines { resolution, .. }
            | SearchOutcome::NoAvailability { resolution, .. } => resolution,
        }
    }
}

/// Query pipeline: parse, resolve and aggregate inside one snapshot, then rank.
#[derive(Clone)]
pub struct PharmacySearch {
    store: Arc<dyn CatalogStore>,
    resolver: MedicineResolver,
    limits: QueryLimitSettings,
}

impl PharmacySearch {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            resolver: MedicineResolver::default(),
            limits: QueryLimitSettings::default(),
        }
    }

    pub fn from_config(store: Arc<dyn CatalogStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            resolver: MedicineResolver::new(&config.matching),
            limits: config.limits.clone(),
        }
    }

    pub fn with_resolver(mut self, resolver: MedicineResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_limits(mut self, limits: QueryLimitSettings) -> Self {
        self.limits = limits;
        self
    }

    /// Search free text: a transcript or a typed message.
    pub async fn search_text(&self, raw: &str) -> SearchResult<SearchOutcome> {
        let query = Query::parse(raw, &self.limits)?;
        self.search(query).await
    }

    /// Search tokens that were already split by the caller.
    pub async fn search_tokens(&self, tokens: Vec<String>) -> SearchResult<SearchOutcome> {
        let query = Query::from_tokens(tokens, &self.limits)?;
        self.search(query).await
    }

    async fn search(&self, query: Query) -> SearchResult<SearchOutcome> {
        let mut snapshot = self.store.begin_snapshot().await?;

        let read = async {
            let resolution = self.resolver.resolve(snapshot.as_mut(), query.tokens()).await?;
            let groups = aggregate(snapshot.as_mut(), &resolution).await?;
            SearchResult::Ok((resolution, groups))
        }
        .await;

        // Release the snapshot before ranking; a read error wins over a finish error.
        let finished = snapshot.finish().await;
        let (resolution, groups) = read?;
        if let Err(e) = finished {
            warn!(error = %e, "Failed to release search snapshot");
        }

        let raw = query.raw().to_string();
        debug!(
            tokens = query.tokens().len(),
            resolved = resolution.resolved.len(),
            pharmacies = groups.len(),
            "Search read complete"
        );

        if resolution.is_empty() {
            info!(tokens = query.tokens().len(), "No medicines recognised");
            return Ok(SearchOutcome::NoResolvedMedicines { raw, resolution });
        }
        if groups.is_empty() {
            info!(resolved = resolution.resolved.len(), "No pharmacy stocks the requested medicines");
            return Ok(SearchOutcome::NoAvailability { raw, resolution });
        }

        let groups = rank(groups);
        info!(pharmacies = groups.len(), "Search found stock");
        Ok(SearchOutcome::Available {
            raw,
            resolution,
            groups,
        })
    }
}
