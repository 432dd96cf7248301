use crate::data::{ExclusionMap, Participant, ParticipantId};
use crate::error::{AssignmentError, Infeasibility, MIN_PARTICIPANTS};
use itertools::Itertools;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Directed compatibility graph: an edge u -> v means u may give to v.
///
/// Neighbor lists keep the order participants were supplied in, so a search
/// over the graph is reproducible for a fixed input.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    order: Vec<ParticipantId>,
    receivers: HashMap<ParticipantId, Vec<ParticipantId>>,
    givers: HashMap<ParticipantId, Vec<ParticipantId>>,
}

impl CompatibilityGraph {
    /// Builds the graph and runs the feasibility pre-check.
    ///
    /// The pre-check only rejects instances that provably have no gift
    /// cycle; passing it does not guarantee the search will find one.
    pub fn build(
        participants: &[Participant],
        exclusions: &ExclusionMap,
    ) -> Result<Self, AssignmentError> {
        let order: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();

        let duplicates: Vec<ParticipantId> = order.iter().copied().duplicates().sorted().collect();
        if !duplicates.is_empty() {
            return Err(AssignmentError::InvalidInput(format!(
                "duplicate participant ids: {:?}",
                duplicates
            )));
        }

        if order.len() < MIN_PARTICIPANTS {
            return Err(Infeasibility::TooFewParticipants { count: order.len() }.into());
        }

        let known: HashSet<ParticipantId> = order.iter().copied().collect();
        for id in exclusions.mentioned_ids().filter(|id| !known.contains(id)).sorted() {
            warn!("Ignoring exclusions for participant {} who is not in this group", id);
        }

        let receivers: HashMap<ParticipantId, Vec<ParticipantId>> = order
            .iter()
            .map(|&giver| {
                let possible = order
                    .iter()
                    .copied()
                    .filter(|&receiver| receiver != giver) // no self
                    .filter(|&receiver| !exclusions.is_excluded(giver, receiver))
                    .collect();
                (giver, possible)
            })
            .collect();

        let mut givers: HashMap<ParticipantId, Vec<ParticipantId>> =
            order.iter().map(|&id| (id, Vec::new())).collect();
        for &giver in &order {
            for receiver in &receivers[&giver] {
                if let Some(list) = givers.get_mut(receiver) {
                    list.push(giver);
                }
            }
        }

        let graph = Self {
            order,
            receivers,
            givers,
        };

        if let Err(reason) = graph.check_feasibility() {
            warn!("Constraint graph rejected: {}", reason);
            return Err(reason.into());
        }

        debug!(
            "Built compatibility graph with {} participants and {} edges ({} exclusion pairs).",
            graph.len(),
            graph.edge_count(),
            exclusions.len()
        );
        Ok(graph)
    }

    /// Participant ids in input order.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.order
    }

    pub fn receivers(&self, giver: ParticipantId) -> &[ParticipantId] {
        self.receivers.get(&giver).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn givers(&self, receiver: ParticipantId) -> &[ParticipantId] {
        self.givers.get(&receiver).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, giver: ParticipantId, receiver: ParticipantId) -> bool {
        self.receivers(giver).contains(&receiver)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.receivers.values().map(Vec::len).sum()
    }

    fn check_feasibility(&self) -> Result<(), Infeasibility> {
        // everyone needs someone to give to and someone to receive from
        for &id in &self.order {
            if self.receivers(id).is_empty() {
                return Err(Infeasibility::NoReceivers(id));
            }
            if self.givers(id).is_empty() {
                return Err(Infeasibility::NoGivers(id));
            }
        }
        self.check_forced_edges()
    }

    /// A participant with a single possible receiver (or giver) forces that
    /// edge into every gift cycle. Forced edges that would give someone two
    /// receivers, two givers, or close a two-person loop rule the instance out.
    fn check_forced_edges(&self) -> Result<(), Infeasibility> {
        let mut forced: Vec<(ParticipantId, ParticipantId)> = Vec::new();
        for &id in &self.order {
            if let [receiver] = self.receivers(id) {
                forced.push((id, *receiver));
            }
            if let [giver] = self.givers(id) {
                forced.push((*giver, id));
            }
        }
        if forced.is_empty() {
            return Ok(());
        }
        let forced: Vec<(ParticipantId, ParticipantId)> = forced.into_iter().unique().collect();
        let edges: HashSet<(ParticipantId, ParticipantId)> = forced.iter().copied().collect();

        let by_receiver = forced.iter().map(|&(g, r)| (r, g)).into_group_map();
        let by_giver = forced.iter().copied().into_group_map();

        for &id in &self.order {
            if let Some(givers) = by_receiver.get(&id).filter(|g| g.len() > 1) {
                return Err(Infeasibility::SharedForcedReceiver {
                    receiver: id,
                    givers: givers.iter().copied().sorted().collect(),
                });
            }
            if let Some(receivers) = by_giver.get(&id).filter(|r| r.len() > 1) {
                return Err(Infeasibility::SharedForcedGiver {
                    giver: id,
                    receivers: receivers.iter().copied().sorted().collect(),
                });
            }
        }

        for &(giver, receiver) in &forced {
            if edges.contains(&(receiver, giver)) {
                return Err(Infeasibility::ForcedPairCycle(
                    giver.min(receiver),
                    giver.max(receiver),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[ParticipantId]) -> Vec<Participant> {
        ids.iter()
            .map(|&id| Participant::new(id, format!("P{id}"), format!("p{id}@example.com")))
            .collect()
    }

    fn excluding(pairs: &[(ParticipantId, ParticipantId)]) -> ExclusionMap {
        let mut map = ExclusionMap::new();
        for &(a, b) in pairs {
            map.insert(a, b);
        }
        map
    }

    #[test]
    fn no_exclusions_gives_complete_graph() {
        let graph = CompatibilityGraph::build(&group(&[1, 2, 3, 4]), &ExclusionMap::new()).unwrap();
        assert_eq!(graph.receivers(1), &[2, 3, 4]);
        assert_eq!(graph.receivers(3), &[1, 2, 4]);
        assert_eq!(graph.givers(4), &[1, 2, 3]);
        assert_eq!(graph.edge_count(), 12);
        assert!(!graph.has_edge(2, 2));
    }

    #[test]
    fn exclusions_remove_both_directions() {
        let graph =
            CompatibilityGraph::build(&group(&[1, 2, 3, 4]), &excluding(&[(1, 2)])).unwrap();
        assert!(!graph.has_edge(1, 2));
        assert!(!graph.has_edge(2, 1));
        assert!(graph.has_edge(1, 3));
        assert_eq!(graph.givers(1), &[3, 4]);
    }

    #[test]
    fn fewer_than_three_is_infeasible() {
        let err = CompatibilityGraph::build(&group(&[1, 2]), &ExclusionMap::new()).unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InfeasibleConstraints(Infeasibility::TooFewParticipants { count: 2 })
        );
    }

    #[test]
    fn participant_excluding_everyone_has_no_receivers() {
        let err = CompatibilityGraph::build(
            &group(&[1, 2, 3, 4]),
            &excluding(&[(1, 2), (1, 3), (1, 4)]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InfeasibleConstraints(Infeasibility::NoReceivers(1))
        );
    }

    #[test]
    fn three_with_one_exclusion_is_rejected_up_front() {
        let err =
            CompatibilityGraph::build(&group(&[1, 2, 3]), &excluding(&[(1, 2)])).unwrap_err();
        assert!(matches!(err, AssignmentError::InfeasibleConstraints(_)));
    }

    #[test]
    fn two_givers_forced_onto_one_receiver() {
        // 1 and 2 can only give to 5
        let err = CompatibilityGraph::build(
            &group(&[1, 2, 3, 4, 5]),
            &excluding(&[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4)]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::InfeasibleConstraints(Infeasibility::SharedForcedReceiver { .. })
                | AssignmentError::InfeasibleConstraints(Infeasibility::SharedForcedGiver { .. })
        ));
    }

    #[test]
    fn disconnected_groups_pass_the_pre_check() {
        // two triangles with every cross pair excluded: no single cycle, but
        // every degree is 2 so only the search can find out
        let cross: Vec<(ParticipantId, ParticipantId)> = [1, 2, 3]
            .into_iter()
            .flat_map(|a| [4, 5, 6].into_iter().map(move |b| (a, b)))
            .collect();
        let graph =
            CompatibilityGraph::build(&group(&[1, 2, 3, 4, 5, 6]), &excluding(&cross)).unwrap();
        assert_eq!(graph.receivers(1), &[2, 3]);
        assert_eq!(graph.receivers(4), &[5, 6]);
    }

    #[test]
    fn duplicate_ids_are_invalid_input() {
        let err = CompatibilityGraph::build(&group(&[1, 2, 2, 3]), &ExclusionMap::new()).unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidInput(_)));
    }

    #[test]
    fn unknown_ids_in_exclusions_are_ignored() {
        let graph =
            CompatibilityGraph::build(&group(&[1, 2, 3]), &excluding(&[(1, 99)])).unwrap();
        assert_eq!(graph.edge_count(), 6);
    }
}
