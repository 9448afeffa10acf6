//! 网本体：结构装配、可发生集计算与发生语义.
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{Marking, Place, Transition, Weight};

#[derive(Debug, Error)]
pub enum FireError {
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("transition {0:?} is not enabled under the supplied marking")]
    NotEnabled(TransitionId),
}

/// 带整数弧权的 P/T 网：库所、迁移与 Pre/Post 关联矩阵.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Net {
    pub places: IndexVec<PlaceId, Place>,
    pub transitions: IndexVec<TransitionId, Transition>,
    pub pre: Incidence<Weight>,
    pub post: Incidence<Weight>,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .finish()
    }
}

impl Net {
    pub fn empty() -> Self {
        Self {
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            pre: Incidence::new(0, 0, 0u64),
            post: Incidence::new(0, 0, 0u64),
        }
    }

    pub fn add_place(&mut self, place: Place) -> PlaceId {
        let place_id = self.places.push(place);
        self.pre.push_place_with_default(0);
        self.post.push_place_with_default(0);
        place_id
    }

    pub fn add_transition(&mut self, transition: Transition) -> TransitionId {
        let transition_id = self.transitions.push(transition);
        self.pre.push_transition_with_default(0);
        self.post.push_transition_with_default(0);
        transition_id
    }

    /// 输入弧: place -> transition. 权重必须为正.
    pub fn set_input_weight(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        debug_assert!(weight > 0, "arc weights are positive by construction");
        self.pre.set(place, transition, weight);
    }

    /// 输出弧: transition -> place. 权重必须为正.
    pub fn set_output_weight(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        debug_assert!(weight > 0, "arc weights are positive by construction");
        self.post.set(place, transition, weight);
    }

    pub fn get_place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn get_transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place].name
    }

    pub fn transition_name(&self, transition: TransitionId) -> &str {
        &self.transitions[transition].name
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn place_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.places.indices()
    }

    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.transitions.indices()
    }

    /// 初始标识由各库所的初始 token 数给出.
    pub fn initial_marking(&self) -> Marking {
        Marking(IndexVec::from(
            self.places.iter().map(|p| p.tokens).collect::<Vec<_>>(),
        ))
    }

    pub fn incidence(&self) -> (&Incidence<Weight>, &Incidence<Weight>) {
        (&self.pre, &self.post)
    }

    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<TransitionId> {
        self.transition_ids()
            .filter(|&transition| self.is_transition_enabled(transition, marking))
            .collect()
    }

    pub fn is_transition_enabled(&self, transition: TransitionId, marking: &Marking) -> bool {
        if transition.index() >= self.transitions_len() {
            return false;
        }
        for (place, row) in self.pre.rows().iter_enumerated() {
            if marking.tokens(place) < row[transition.index()] {
                return false;
            }
        }
        true
    }

    /// ℕ 语义下的单步发生；覆盖图构造使用 ω 语义版本, 见 [`crate::cover`].
    pub fn fire_transition(
        &self,
        marking: &Marking,
        transition: TransitionId,
    ) -> Result<Marking, FireError> {
        if transition.index() >= self.transitions_len() {
            return Err(FireError::OutOfBounds(transition));
        }
        if !self.is_transition_enabled(transition, marking) {
            return Err(FireError::NotEnabled(transition));
        }

        let mut next = marking.clone();

        for place in self.place_ids() {
            let weight = *self.pre.get(place, transition);
            if weight > 0 {
                let tokens = next.tokens_mut(place);
                *tokens = tokens
                    .checked_sub(weight)
                    .expect("enabled transition must have sufficient tokens");
            }
        }

        for place in self.place_ids() {
            let weight = *self.post.get(place, transition);
            if weight > 0 {
                *next.tokens_mut(place) += weight;
            }
        }

        Ok(next)
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let node_id = format!("place_{}", place_id.index());
            let label = format!("{}\\n{}", escape_label(&place.name), place.tokens);
            let _ = writeln!(
                &mut dot,
                "    {} [label=\"{}\", shape=circle, style=filled, fillcolor=\"#e3f2fd\"];",
                node_id, label
            );
        }

        for (transition_id, transition) in self.transitions.iter_enumerated() {
            let node_id = format!("trans_{}", transition_id.index());
            let _ = writeln!(
                &mut dot,
                "    {} [label=\"{}\", shape=box, style=filled, fillcolor=\"#ffe0b2\"];",
                node_id,
                escape_label(&transition.name)
            );
        }

        for (place_id, row) in self.pre.rows().iter_enumerated() {
            let place_node = format!("place_{}", place_id.index());
            for (idx, weight) in row.iter().enumerate() {
                if *weight == 0 {
                    continue;
                }
                let transition_node = format!("trans_{}", idx);
                if *weight == 1 {
                    let _ = writeln!(&mut dot, "    {} -> {};", place_node, transition_node);
                } else {
                    let _ = writeln!(
                        &mut dot,
                        "    {} -> {} [label=\"{}\"];",
                        place_node, transition_node, weight
                    );
                }
            }
        }

        for (place_id, row) in self.post.rows().iter_enumerated() {
            let place_node = format!("place_{}", place_id.index());
            for (idx, weight) in row.iter().enumerate() {
                if *weight == 0 {
                    continue;
                }
                let transition_node = format!("trans_{}", idx);
                if *weight == 1 {
                    let _ = writeln!(&mut dot, "    {} -> {};", transition_node, place_node);
                } else {
                    let _ = writeln!(
                        &mut dot,
                        "    {} -> {} [label=\"{}\"];",
                        transition_node, place_node, weight
                    );
                }
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::empty()
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_place_and_transition_updates_incidence() {
        let mut net = Net::empty();
        let p = net.add_place(Place::new("p", 1));
        let t = net.add_transition(Transition::new("t"));

        net.set_input_weight(p, t, 1);
        net.set_output_weight(p, t, 1);

        assert_eq!(net.places_len(), 1);
        assert_eq!(net.transitions_len(), 1);
        assert_eq!(*net.pre.get(p, t), 1);
        assert_eq!(*net.post.get(p, t), 1);
    }

    #[test]
    fn fire_moves_tokens_along_arcs() {
        let mut net = Net::empty();
        let p0 = net.add_place(Place::new("p0", 1));
        let p1 = net.add_place(Place::new("p1", 0));
        let t0 = net.add_transition(Transition::new("t0"));

        net.set_input_weight(p0, t0, 1);
        net.set_output_weight(p1, t0, 2);

        let marking = net.initial_marking();
        assert_eq!(net.enabled_transitions(&marking), vec![t0]);

        let next = net.fire_transition(&marking, t0).unwrap();
        assert_eq!(next.tokens(p0), 0);
        assert_eq!(next.tokens(p1), 2);

        // 原标识未被改写
        assert_eq!(marking.tokens(p0), 1);
        assert!(matches!(
            net.fire_transition(&next, t0),
            Err(FireError::NotEnabled(_))
        ));
    }
}
