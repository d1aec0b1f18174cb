use crate::error::SamplerError;
use crate::lattice::{Lattice, SupportsWolfAlgorithm};
use rand::distr::{Bernoulli, Distribution};

/// Probability of adding a parallel neighbour to the cluster, `1 - exp(-interaction * beta)`.
fn wolf_probability(interaction: f64, beta: f64) -> f64 {
    -(-interaction * beta).exp_m1()
}

/// Grows and flips single Wolff clusters.
///
/// The visited grid, work stack and cluster list are kept between updates so a
/// long run allocates only once. The visited grid is indexed by
/// [`Lattice::linear_index`] and is all `false` between calls.
#[derive(Debug)]
pub struct WolffClusterFlipper<L: Lattice> {
    inclusion_dist: Bernoulli,
    in_cluster: Vec<bool>,
    sites_to_check: Vec<L::Idx>,
    cluster: Vec<L::Idx>,
    cluster_state: i8,
}

impl<L: SupportsWolfAlgorithm> WolffClusterFlipper<L> {
    /// Flipper for `lattice` at inverse temperature `beta`.
    pub fn new(lattice: &L, beta: f64) -> Result<Self, SamplerError> {
        if !beta.is_finite() || beta < 0. {
            return Err(SamplerError::InvalidBeta(beta));
        }
        let probability = wolf_probability(lattice.get_pots_interaction(), beta);
        Self::with_inclusion_probability(lattice, probability)
            .ok_or(SamplerError::InvalidBeta(beta))
    }

    pub(crate) fn with_inclusion_probability(lattice: &L, probability: f64) -> Option<Self> {
        let inclusion_dist = Bernoulli::new(probability).ok()?;
        let number_sites = lattice.number_sites();
        Some(WolffClusterFlipper {
            inclusion_dist,
            in_cluster: vec![false; number_sites],
            sites_to_check: Vec::with_capacity(number_sites),
            cluster: Vec::with_capacity(number_sites),
            cluster_state: 0,
        })
    }

    pub fn inclusion_probability(&self) -> f64 {
        self.inclusion_dist.p()
    }

    /// Sites of the most recently flipped cluster, the seed first.
    pub fn last_cluster(&self) -> &[L::Idx] {
        &self.cluster
    }

    /// Spin shared by the most recent cluster before it was flipped.
    pub fn last_cluster_state(&self) -> i8 {
        self.cluster_state
    }

    /// Grow one cluster from a uniformly drawn seed, flip it and return the change of
    /// the total magnetisation, `-2 * s * cluster_size` for seed spin `s`.
    pub fn flip_one_cluster<R: rand::Rng + ?Sized>(&mut self, lattice: &mut L, rng: &mut R) -> i64 {
        self.grow_cluster(lattice, rng);

        for &idx in &self.cluster {
            lattice.flip(idx);
            self.in_cluster[lattice.linear_index(idx)] = false;
        }

        -2 * self.cluster_state as i64 * self.cluster.len() as i64
    }

    fn grow_cluster<R: rand::Rng + ?Sized>(&mut self, lattice: &L, rng: &mut R) {
        self.cluster.clear();
        self.sites_to_check.clear();

        let initial_index = lattice.draw_random_index(rng);
        self.cluster_state = lattice.idx_into(initial_index);
        self.in_cluster[lattice.linear_index(initial_index)] = true;
        self.cluster.push(initial_index);
        self.sites_to_check.push(initial_index);

        while let Some(candidate_for_cluster) = self.sites_to_check.pop() {
            'neighbours: for neighbour_idx in lattice.iter_neighbours(candidate_for_cluster) {
                let linear = lattice.linear_index(neighbour_idx);
                if self.in_cluster[linear] || lattice.idx_into(neighbour_idx) != self.cluster_state
                {
                    continue 'neighbours;
                }

                // one independent draw per bond, a rejected site may still join via another bond
                if self.inclusion_dist.sample(rng) {
                    self.in_cluster[linear] = true;
                    self.cluster.push(neighbour_idx);
                    self.sites_to_check.push(neighbour_idx);
                }
            }
        }
    }
}
