//! 标识代数：`ℕ ∪ {ω}` 上的相等、覆盖、ω 加速与发生语义.
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Marking, Weight};
use crate::net::Net;

/// token 数：非负整数或哨兵 ω（无界）.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Finite(Weight),
    Omega,
}

impl Token {
    pub fn is_omega(self) -> bool {
        matches!(self, Token::Omega)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Finite(value) => write!(f, "{value}"),
            Token::Omega => write!(f, "ω"),
        }
    }
}

/// `ℕ ∪ {ω}` 上的标识；键集合固定为网的库所集合.
///
/// 所有运算都产生新标识, 绝不原地改写——构造过程中拍下的快照在后续步骤
/// 之后仍然有效.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OmegaMarking(IndexVec<PlaceId, Token>);

impl OmegaMarking {
    pub fn new(tokens: IndexVec<PlaceId, Token>) -> Self {
        Self(tokens)
    }

    pub fn from_marking(marking: &Marking) -> Self {
        Self(IndexVec::from(
            marking.iter().map(|(_, &v)| Token::Finite(v)).collect::<Vec<_>>(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self, place: PlaceId) -> Token {
        self.0[place]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &Token)> {
        self.0.iter_enumerated()
    }

    /// 逐库所相等.
    pub fn identical(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len(), other.len());
        self == other
    }

    /// `self ≥ other`：ω 在左侧恒满足; 左侧有限值盖不住右侧 ω.
    pub fn covers(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len(), other.len());
        self.0.iter().zip(other.0.iter()).all(|(lhs, rhs)| {
            match (lhs, rhs) {
                (Token::Omega, _) => true,
                (Token::Finite(_), Token::Omega) => false,
                (Token::Finite(l), Token::Finite(r)) => l >= r,
            }
        })
    }

    /// ω 加速：当 `self` 严格覆盖某祖先时调用, 把所有增长过（或已为 ω）的
    /// 分量提升为 ω. 这是保证终止的健全上近似.
    pub fn accelerate(&self, ancestor: &Self) -> Self {
        debug_assert_eq!(self.len(), ancestor.len());
        Self(IndexVec::from(
            self.0
                .iter()
                .zip(ancestor.0.iter())
                .map(|(new, old)| match (new, old) {
                    (Token::Omega, _) | (_, Token::Omega) => Token::Omega,
                    (Token::Finite(n), Token::Finite(o)) if n > o => Token::Omega,
                    (token, _) => *token,
                })
                .collect::<Vec<_>>(),
        ))
    }

    pub fn has_omega(&self) -> bool {
        self.0.iter().any(|token| token.is_omega())
    }

    /// 所有有限分量的最大值（空网或全 ω 时为 0）.
    pub fn max_finite(&self) -> Weight {
        self.0
            .iter()
            .filter_map(|token| match token {
                Token::Finite(value) => Some(*value),
                Token::Omega => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// 迁移在本标识下是否可激发：ω 库所视为 token 充足.
    pub fn enables(&self, net: &Net, transition: TransitionId) -> bool {
        net.pre.column(transition).all(|(place, &weight)| {
            weight == 0
                || match self.0[place] {
                    Token::Omega => true,
                    Token::Finite(tokens) => tokens >= weight,
                }
        })
    }

    /// 发生：ω 分量原样拷贝, 有限分量先减 Pre 再加 Post.
    ///
    /// 前置条件：迁移可激发（调用方必须先查 [`Self::enables`]）.
    pub fn fire(&self, net: &Net, transition: TransitionId) -> Self {
        debug_assert!(
            self.enables(net, transition),
            "firing a disabled transition is an internal contract violation"
        );
        let mut next = self.clone();
        for (place, token) in next.0.iter_mut().enumerate() {
            let place = PlaceId::new(place as u32);
            if let Token::Finite(tokens) = token {
                let consumed = *net.pre.get(place, transition);
                let produced = *net.post.get(place, transition);
                *tokens = tokens
                    .checked_sub(consumed)
                    .expect("enabled transition must have sufficient tokens")
                    + produced;
            }
        }
        next
    }
}

impl fmt::Display for OmegaMarking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(","))
    }
}

impl fmt::Debug for OmegaMarking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::{Place, Transition};

    fn omega_marking(tokens: &[Token]) -> OmegaMarking {
        OmegaMarking::new(IndexVec::from(tokens.to_vec()))
    }

    const W: Token = Token::Omega;

    fn fin(v: Weight) -> Token {
        Token::Finite(v)
    }

    #[test]
    fn identical_and_covers_are_reflexive() {
        for m in [
            omega_marking(&[fin(0), fin(3)]),
            omega_marking(&[W, fin(1), W]),
        ] {
            assert!(m.identical(&m.clone()));
            assert!(m.covers(&m.clone()));
        }
    }

    #[test]
    fn covers_respects_omega_sides() {
        let omega_left = omega_marking(&[W, fin(1)]);
        let finite = omega_marking(&[fin(5), fin(1)]);

        assert!(omega_left.covers(&finite));
        assert!(!finite.covers(&omega_left));
        assert!(!omega_marking(&[fin(0), fin(2)]).covers(&omega_marking(&[fin(1), fin(0)])));
    }

    #[test]
    fn accelerate_promotes_exactly_grown_places() {
        let grown = omega_marking(&[fin(2), fin(1), W, fin(0)]);
        let ancestor = omega_marking(&[fin(1), fin(1), fin(9), fin(0)]);
        assert!(grown.covers(&ancestor) && !grown.identical(&ancestor));

        let widened = grown.accelerate(&ancestor);
        assert_eq!(widened, omega_marking(&[W, fin(1), W, fin(0)]));

        // 祖先为 ω 的分量保持 ω
        let widened = omega_marking(&[fin(1)]).accelerate(&omega_marking(&[W]));
        assert_eq!(widened, omega_marking(&[W]));
    }

    #[test]
    fn accelerate_leaves_source_untouched() {
        let grown = omega_marking(&[fin(2), fin(0)]);
        let _ = grown.accelerate(&omega_marking(&[fin(1), fin(0)]));
        assert_eq!(grown, omega_marking(&[fin(2), fin(0)]));
    }

    #[test]
    fn fire_copies_omega_and_shifts_finite() {
        let mut net = Net::empty();
        let p0 = net.add_place(Place::new("p0", 0));
        let p1 = net.add_place(Place::new("p1", 0));
        let t = net.add_transition(Transition::new("t"));
        net.set_input_weight(p0, t, 2);
        net.set_output_weight(p1, t, 3);

        let marking = omega_marking(&[W, fin(1)]);
        assert!(marking.enables(&net, t));

        let next = marking.fire(&net, t);
        assert_eq!(next.tokens(p0), W);
        assert_eq!(next.tokens(p1), fin(4));

        let short = omega_marking(&[fin(1), fin(0)]);
        assert!(!short.enables(&net, t));
    }

    #[test]
    fn display_renders_omega_glyph() {
        let marking = omega_marking(&[fin(1), W, fin(0)]);
        assert_eq!(marking.to_string(), "(1,ω,0)");
    }
}
