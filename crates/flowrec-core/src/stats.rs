//! Summary statistics over a recording session.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::emission::Emission;
use crate::group::FlowGroups;

/// Emission counts per flow, in first-appearance order.
///
/// Serialized as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowCounts(Vec<(String, usize)>);

impl FlowCounts {
    /// Count for one flow.
    pub fn get(&self, flow: &str) -> Option<usize> {
        self.0
            .iter()
            .find_map(|(name, count)| (name == flow).then_some(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl From<&FlowGroups<'_>> for FlowCounts {
    fn from(groups: &FlowGroups<'_>) -> Self {
        Self(
            groups
                .iter()
                .map(|(flow, emissions)| (flow.to_string(), emissions.len()))
                .collect(),
        )
    }
}

impl Serialize for FlowCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (flow, count) in &self.0 {
            map.serialize_entry(flow, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FlowCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = FlowCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of flow names to emission counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FlowCounts, A::Error> {
                let mut counts = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((flow, count)) = access.next_entry::<String, usize>()? {
                    counts.push((flow, count));
                }
                Ok(FlowCounts(counts))
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

/// Aggregate figures for a non-empty session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_emissions: usize,
    pub flow_count: usize,
    pub emissions_by_flow: FlowCounts,
    /// Latest minus earliest timestamp; `0` when no emission has one.
    pub duration_ms: i64,
    pub first_emission: Option<i64>,
    pub last_emission: Option<i64>,
}

/// Statistics for a recording. Serializes to `{}` for an empty session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(flatten)]
    summary: Option<Summary>,
}

impl Statistics {
    /// Computes statistics over `emissions`.
    ///
    /// Timestamps are not assumed to be sorted. Emissions without an integer
    /// timestamp are counted but do not affect the timing bounds.
    pub fn summarize(emissions: &[Emission]) -> Self {
        if emissions.is_empty() {
            return Self::default();
        }

        let groups = FlowGroups::new(emissions);
        let (first, last) = emissions
            .iter()
            .filter_map(Emission::timestamp)
            .fold(None, |bounds, ts| match bounds {
                None => Some((ts, ts)),
                Some((min, max)) => Some((ts.min(min), ts.max(max))),
            })
            .unzip();

        let duration_ms = match (first, last) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        };

        Self {
            summary: Some(Summary {
                total_emissions: emissions.len(),
                flow_count: groups.len(),
                emissions_by_flow: FlowCounts::from(&groups),
                duration_ms,
                first_emission: first,
                last_emission: last,
            }),
        }
    }

    pub const fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub const fn is_empty(&self) -> bool {
        self.summary.is_none()
    }

    pub fn total_emissions(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.total_emissions)
    }

    pub fn flow_count(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.flow_count)
    }

    pub fn duration_ms(&self) -> i64 {
        self.summary.as_ref().map_or(0, |s| s.duration_ms)
    }
}
