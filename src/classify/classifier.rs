//! # Signal Classifier
//!
//! Walks the rule table against a record's collected buckets and hands
//! out roles. Classification is assignment only: a classified bucket
//! keeps its full value sequence so occurrence indices stay aligned
//! between signals, and the rule's window travels along for the frame
//! assembler to apply per value.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::classify::role::SignalRole;
use crate::classify::rules::{RuleTable, ValueRange};
use crate::wire::collector::BucketMap;
use crate::wire::protocol::BucketKey;

/// A value bucket annotated with its semantic role.
#[derive(Debug, Clone)]
pub struct ClassifiedBucket {
    /// Assigned role
    pub role: SignalRole,

    /// Acceptance window from the matching rule, applied downstream
    pub range: ValueRange,

    /// The bucket's full value sequence in encounter order
    pub values: Vec<f64>,
}

impl ClassifiedBucket {
    /// Number of collected samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the bucket matched but held no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Classification result: at most one bucket per role
#[derive(Debug, Clone, Default)]
pub struct ClassifiedSignals {
    by_role: HashMap<SignalRole, ClassifiedBucket>,
}

impl ClassifiedSignals {
    /// The bucket classified as `role`, if any rule matched one.
    pub fn get(&self, role: SignalRole) -> Option<&ClassifiedBucket> {
        self.by_role.get(&role)
    }

    /// Values of the `role` bucket, empty when the role went unmatched.
    pub fn values(&self, role: SignalRole) -> &[f64] {
        self.by_role
            .get(&role)
            .map(|bucket| bucket.values.as_slice())
            .unwrap_or(&[])
    }

    /// First occurrence of a per-flight signal.
    pub fn first_value(&self, role: SignalRole) -> Option<f64> {
        self.values(role).first().copied()
    }

    /// Number of roles that found a bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_role.len()
    }

    /// True when no rule matched any bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty()
    }
}

/// Assigns roles to collected buckets by first-match-wins table order.
///
/// Each rule claims at most one bucket and each bucket is claimed at most
/// once; buckets no rule names are ignored as noise.
pub fn classify(buckets: &BucketMap, table: &RuleTable) -> ClassifiedSignals {
    let mut signals = ClassifiedSignals::default();
    let mut claimed: HashSet<BucketKey> = HashSet::new();

    for rule in table.rules() {
        let bucket_key = BucketKey::new(rule.depth, rule.key);
        if signals.by_role.contains_key(&rule.role) || claimed.contains(&bucket_key) {
            continue;
        }

        if let Some(values) = buckets.numeric_bucket(rule.depth, rule.key) {
            claimed.insert(bucket_key);
            debug!(
                role = %rule.role,
                bucket = %bucket_key,
                samples = values.len(),
                "classified signal"
            );
            signals.by_role.insert(
                rule.role,
                ClassifiedBucket {
                    role: rule.role,
                    range: rule.range,
                    values: values.to_vec(),
                },
            );
        }
    }

    signals
}
