//! Grouping of emissions by flow.

use std::collections::HashMap;

use crate::emission::Emission;

/// Emissions partitioned by flow name.
///
/// Flows are kept in the order they first appear; each flow's emissions keep
/// their source order. Emissions without a flow name land under
/// [`UNKNOWN_FLOW`](crate::UNKNOWN_FLOW).
#[derive(Debug, Clone, Default)]
pub struct FlowGroups<'a> {
    groups: Vec<(&'a str, Vec<&'a Emission>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> FlowGroups<'a> {
    /// Groups `emissions` by flow.
    pub fn new(emissions: &'a [Emission]) -> Self {
        let mut groups: Vec<(&'a str, Vec<&'a Emission>)> = Vec::new();
        let mut index = HashMap::new();

        for emission in emissions {
            let flow = emission.flow_or_unknown();
            let slot = *index.entry(flow).or_insert_with(|| {
                groups.push((flow, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(emission);
        }

        Self { groups, index }
    }

    /// Number of distinct flows.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Emissions of one flow, in source order.
    pub fn get(&self, flow: &str) -> Option<&[&'a Emission]> {
        self.index
            .get(flow)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Flow names in first-appearance order.
    pub fn flows(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(flow, _)| *flow)
    }

    /// `(flow, emissions)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Emission])> + '_ {
        self.groups
            .iter()
            .map(|(flow, emissions)| (*flow, emissions.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collect::collect_str;
    use crate::extract::LineExtractor;
    use crate::UNKNOWN_FLOW;

    fn emissions(log: &str) -> Vec<Emission> {
        collect_str(&LineExtractor::default(), log).emissions
    }

    const MIXED: &str = r#"FLOW_EVENT:{"flow":"saveState","timestamp":1,"value":"Idle"}
FLOW_EVENT:{"flow":"cardState","timestamp":2,"value":"Loading"}
FLOW_EVENT:{"timestamp":3,"value":"orphan"}
FLOW_EVENT:{"flow":"saveState","timestamp":4,"value":"Saving"}
FLOW_EVENT:{"flow":"cardState","timestamp":5,"value":"Loaded"}
FLOW_EVENT:{"flow":"saveState","timestamp":6,"value":"Saved"}"#;

    #[test]
    fn flows_are_in_first_appearance_order() {
        let emissions = emissions(MIXED);
        let groups = FlowGroups::new(&emissions);

        let flows: Vec<_> = groups.flows().collect();
        assert_eq!(flows, ["saveState", "cardState", UNKNOWN_FLOW]);
    }

    #[test]
    fn preserves_order_within_each_flow() {
        let emissions = emissions(MIXED);
        let groups = FlowGroups::new(&emissions);

        let save: Vec<_> = groups
            .get("saveState")
            .unwrap()
            .iter()
            .map(|e| e.log_line())
            .collect();
        assert_eq!(save, [1, 4, 6]);
    }

    #[test]
    fn partitions_without_loss_or_duplication() {
        let emissions = emissions(MIXED);
        let groups = FlowGroups::new(&emissions);

        let mut lines: Vec<_> = groups
            .iter()
            .flat_map(|(_, group)| group.iter().map(|e| e.log_line()))
            .collect();
        lines.sort_unstable();

        let expected: Vec<_> = emissions.iter().map(Emission::log_line).collect();
        assert_eq!(lines, expected);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn unknown_flow_collects_missing_names() {
        let emissions = emissions(MIXED);
        let groups = FlowGroups::new(&emissions);

        let unknown = groups.get(UNKNOWN_FLOW).unwrap();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].log_line(), 3);
    }

    #[test]
    fn empty_input_has_no_groups() {
        let groups = FlowGroups::new(&[]);
        assert!(groups.is_empty());
        assert!(groups.get("cardState").is_none());
    }
}
