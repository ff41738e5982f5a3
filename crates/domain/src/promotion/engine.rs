use std::collections::BTreeMap;

use cart_store::Cart;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{PromoSet, Promotion, PromotionError};
use crate::PriceList;

/// Identifier assigned to a rule at registration time.
///
/// Ids start at 1, strictly increase and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(u64);

impl RuleId {
    /// Returns the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A promotion rule.
///
/// Rules are pure: they derive candidate promotions from a cart snapshot and
/// the current prices, and never observe the output of other rules.
pub trait PromotionRule: Send + Sync {
    /// Returns a human-readable rule name, used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the promotions this rule grants for the cart.
    fn evaluate(&self, cart: &Cart, prices: &PriceList) -> Vec<Promotion>;
}

impl<F> PromotionRule for F
where
    F: Fn(&Cart, &PriceList) -> Vec<Promotion> + Send + Sync,
{
    fn evaluate(&self, cart: &Cart, prices: &PriceList) -> Vec<Promotion> {
        self(cart, prices)
    }
}

#[derive(Default)]
struct Registry {
    last_id: u64,
    rules: BTreeMap<RuleId, Box<dyn PromotionRule>>,
}

/// Registry of promotion rules.
///
/// Registration and removal take the write lock; evaluation holds the read
/// lock for the duration of `apply_rules`, so concurrent evaluations proceed
/// in parallel.
#[derive(Default)]
pub struct PromotionEngine {
    registry: RwLock<Registry>,
}

impl PromotionEngine {
    /// Creates an engine with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule and returns its id.
    pub fn add_rule(&self, rule: impl PromotionRule + 'static) -> RuleId {
        let mut registry = self.registry.write();
        registry.last_id += 1;
        let id = RuleId(registry.last_id);
        tracing::debug!(rule_id = %id, rule = rule.name(), "promotion rule registered");
        registry.rules.insert(id, Box::new(rule));
        id
    }

    /// Removes a rule. Returns whether a rule was removed; removing an
    /// unknown id is not an error.
    pub fn del_rule(&self, id: RuleId) -> bool {
        self.registry.write().rules.remove(&id).is_some()
    }

    /// Returns the number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.registry.read().rules.len()
    }

    /// Returns the ids of the registered rules in registration order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.registry.read().rules.keys().copied().collect()
    }

    /// Evaluates every registered rule, in registration order, and folds the
    /// results into one promotion set.
    ///
    /// Fails on the first promotion that is inconsistent with the cart.
    pub fn apply_rules(&self, cart: &Cart, prices: &PriceList) -> Result<PromoSet, PromotionError> {
        let registry = self.registry.read();
        let mut promo_set = PromoSet::new();

        for (id, rule) in &registry.rules {
            for promotion in rule.evaluate(cart, prices) {
                promo_set.add(promotion, cart).map_err(|reason| {
                    tracing::error!(rule_id = %id, rule = rule.name(), %reason, "malformed promotion");
                    PromotionError::Malformed {
                        rule_id: *id,
                        rule: rule.name().to_string(),
                        reason,
                    }
                })?;
            }
        }

        metrics::counter!("promotion_rules_applied_total").increment(registry.rules.len() as u64);
        Ok(promo_set)
    }
}

impl std::fmt::Debug for PromotionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("PromotionEngine")
            .field("rules", &registry.rules.len())
            .field("last_id", &registry.last_id)
            .finish()
    }
}
