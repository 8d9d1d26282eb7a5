use rand::{Rng, seq::IndexedRandom as _};

use crate::{GeneticError, Member};

/// Ordered, index-addressable set of members.
///
/// The number of members is fixed at construction.
#[derive(Debug, Clone)]
pub struct Population<M> {
    members: Vec<M>,
}

impl<M> Population<M>
where
    M: Member,
{
    pub fn new(members: Vec<M>) -> Result<Self, GeneticError> {
        if members.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(Self { members })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn members(&self) -> &[M] {
        &self.members
    }

    /// Mutable access to the members; the slice cannot grow or shrink.
    pub fn members_mut(&mut self) -> &mut [M] {
        &mut self.members
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&M> {
        self.members.get(index)
    }

    /// Number of members still alive in the current generation.
    #[must_use]
    pub fn num_alive(&self) -> usize {
        self.members.iter().filter(|m| m.is_alive()).count()
    }

    #[must_use]
    pub fn fitnesses(&self) -> Vec<f32> {
        self.members.iter().map(Member::fitness).collect()
    }

    /// Index of the fittest member; the lowest index wins ties.
    #[must_use]
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, member) in self.members.iter().enumerate().skip(1) {
            if member.fitness().total_cmp(&self.members[best].fitness()).is_gt() {
                best = i;
            }
        }
        best
    }

    /// Picks a member index with probability proportional to its fitness, uniformly
    /// when no member has positive fitness.
    pub fn select_parent<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        select_weighted(&self.fitnesses(), rng)
    }

    pub(crate) fn reset_all(&mut self) {
        for member in &mut self.members {
            member.reset();
        }
    }
}

/// Draws an index with probability proportional to `weights[index]`.
///
/// Falls back to a uniform choice when no proportional draw is possible (every weight
/// is zero, or some weight is negative or not finite).
///
/// # Examples
///
/// ```
/// use neuroflap_training::select_weighted;
///
/// let mut rng = rand::rng();
/// assert_eq!(select_weighted(&[0.0, 0.0, 4.0], &mut rng), 2);
/// assert!(select_weighted(&[0.0, 0.0, 0.0], &mut rng) < 3);
/// ```
///
/// # Panics
///
/// Panics if `weights` is empty.
pub fn select_weighted<R>(weights: &[f32], rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(!weights.is_empty(), "cannot select from an empty population");
    let indices = (0..weights.len()).collect::<Vec<_>>();
    match indices.choose_weighted(rng, |&i| weights[i]) {
        Ok(&index) => index,
        Err(_) => rng.random_range(0..weights.len()),
    }
}
