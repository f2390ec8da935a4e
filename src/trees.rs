//! Random rooted trees by biased recursive attachment.
//!
//! Nodes are visited in a random order; the i-th node attaches to one of the
//! i nodes before it, picked by a Kumaraswamy sample. Shapes near (1, 1) give
//! uniform attachment. Mass near 1 attaches to recent nodes (long paths), mass
//! near 0 attaches to early nodes (stars).

use rand::distributions::Distribution;
use rand::seq::SliceRandom;

use crate::distributions::ShapeParams;
use crate::error::AutotestResult;
use crate::scope::Scope;

/// Parent array of a rooted tree. The root has no parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    parents: Vec<Option<usize>>,
}

impl Tree {
    pub fn from_parents(parents: Vec<Option<usize>>) -> Self {
        Self { parents }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    pub fn root(&self) -> Option<usize> {
        self.parents.iter().position(Option::is_none)
    }

    /// `(child, parent)` pairs, in child order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter_map(|(child, parent)| parent.map(|p| (child, p)))
    }

    pub fn into_parents(self) -> Vec<Option<usize>> {
        self.parents
    }
}

/// Generator declaring `tree/loga` and `tree/logb`.
#[derive(Debug, Clone)]
pub struct TreeGen {
    shape: ShapeParams,
}

impl TreeGen {
    pub const PREFIX: &'static str = "tree";

    pub fn new(scope: &mut Scope) -> AutotestResult<Self> {
        Ok(Self {
            shape: ShapeParams::new(scope, Self::PREFIX)?,
        })
    }

    /// Tree on `n` labeled nodes with shuffled labels.
    pub fn generate(&self, scope: &mut Scope, n: usize) -> AutotestResult<Tree> {
        self.generate_with(scope, n, true)
    }

    /// With `shuffle == false`, node 0 is the root and every parent has a
    /// smaller label than its child.
    pub fn generate_with(&self, scope: &mut Scope, n: usize, shuffle: bool) -> AutotestResult<Tree> {
        let dist = self.shape.distribution(scope)?;
        let rng = scope.random();

        let mut order: Vec<usize> = (0..n).collect();
        if shuffle {
            order.shuffle(rng);
        }
        let samples: Vec<f64> = (0..n.saturating_sub(1)).map(|_| dist.sample(rng)).collect();

        let mut parents = vec![None; n];
        for i in 1..n {
            let j = (samples[i - 1] * i as f64) as usize;
            debug_assert!(j < i);
            parents[order[i]] = Some(order[j]);
        }
        Ok(Tree::from_parents(parents))
    }
}
