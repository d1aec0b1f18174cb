use crate::lattice::{Lattice, SupportsWolfAlgorithm};
use rand::{self, Rng};

/// Periodic `width x width` lattice of Ising spins with unit nearest neighbour coupling.
///
/// Spins are stored row-major, site `(x, y)` lives at `x * width + y`.
#[derive(Debug, Clone)]
pub struct SquareLattice {
    width: usize,
    interaction: f64,
    sites: Vec<i8>,
}

impl SquareLattice {
    pub fn new_with_ones(width: usize) -> Self {
        assert!(width > 0, "The lattice width must be positive.");
        SquareLattice {
            width,
            interaction: 1.,
            sites: vec![1; width * width],
        }
    }

    /// Every spin is drawn independently, `+1` and `-1` with equal probability.
    pub fn new_random<R: Rng + ?Sized>(width: usize, rng: &mut R) -> Self {
        let mut lattice = Self::new_with_ones(width);
        for spin in lattice.sites.iter_mut() {
            if rng.random_bool(0.5) {
                *spin = -1;
            }
        }
        lattice
    }

    /// Build a lattice from row-major spins. Returns `None` if the length is not `width^2`
    /// or any value is not `+1` or `-1`.
    pub fn from_spins(width: usize, spins: Vec<i8>) -> Option<Self> {
        if width == 0 || spins.len() != width * width || spins.iter().any(|s| s.abs() != 1) {
            return None;
        }
        Some(SquareLattice {
            width,
            interaction: 1.,
            sites: spins,
        })
    }

    fn get_all_neighbour_indices(&self, idx_i: usize, idx_j: usize) -> [(usize, usize); 4] {
        [
            (
                (idx_i as isize - 1).rem_euclid(self.width as isize) as usize,
                idx_j,
            ),
            (
                idx_i,
                (idx_j as isize - 1).rem_euclid(self.width as isize) as usize,
            ),
            ((idx_i + 1).rem_euclid(self.width), idx_j),
            (idx_i, (idx_j + 1).rem_euclid(self.width)),
        ]
    }

    pub fn is_state_equal(&self, other: &Self) -> bool {
        self.sites == other.sites
    }

    pub fn flip_all(&mut self) {
        for spin in self.sites.iter_mut() {
            *spin = -*spin;
        }
    }
}

impl Lattice for SquareLattice {
    type Idx = (usize, usize);

    fn number_sites(&self) -> usize {
        self.sites.len()
    }

    fn linear_index(&self, idx: Self::Idx) -> usize {
        idx.0 * self.width + idx.1
    }

    fn flip(&mut self, flip_idx: Self::Idx) {
        let i = self.linear_index(flip_idx);
        self.sites[i] = -self.sites[i];
    }

    fn idx_into(&self, idx: Self::Idx) -> i8 {
        self.sites[self.linear_index(idx)]
    }

    fn draw_random_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self::Idx {
        (
            rng.random_range(0..self.width),
            rng.random_range(0..self.width),
        )
    }

    fn get_sum_of_spins(&self) -> i64 {
        self.sites.iter().map(|s| *s as i64).sum()
    }

    fn spins(&self) -> &[i8] {
        &self.sites
    }

    fn describe(&self) -> String {
        format!(
            "{}x{} Periodic Square Lattice With Nearest Neighbour Interaction {}",
            self.width, self.width, self.interaction,
        )
    }
}

impl SupportsWolfAlgorithm for SquareLattice {
    fn iter_neighbours(&self, index: Self::Idx) -> impl Iterator<Item = <Self as Lattice>::Idx> {
        self.get_all_neighbour_indices(index.0, index.1).into_iter()
    }

    fn get_pots_interaction(&self) -> f64 {
        2. * self.interaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use std::collections::HashSet;

    // the test lattice looks like
    //  1, -1,  1
    //  1,  1,  1
    // -1, -1,  1
    fn build_square_test_lattice() -> SquareLattice {
        SquareLattice::from_spins(3, vec![1, -1, 1, 1, 1, 1, -1, -1, 1]).unwrap()
    }

    #[test]
    fn square_lattice_number_sites() {
        assert_eq!(SquareLattice::new_with_ones(3).number_sites(), 9);
        assert_eq!(SquareLattice::new_with_ones(5).number_sites(), 25);
        assert_eq!(SquareLattice::new_with_ones(1).number_sites(), 1);
    }

    #[test]
    fn square_lattice_from_spins_rejects_bad_input() {
        assert!(SquareLattice::from_spins(2, vec![1, 1, 1]).is_none());
        assert!(SquareLattice::from_spins(2, vec![1, 0, 1, -1]).is_none());
        assert!(SquareLattice::from_spins(0, vec![]).is_none());
    }

    #[test]
    fn square_lattice_get_all_neighbour_indices() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(
            test_lattice.get_all_neighbour_indices(0, 0),
            [(2, 0), (0, 2), (1, 0), (0, 1)],
            "Neighbours of (0, 0) not matching."
        );
        assert_eq!(
            test_lattice.get_all_neighbour_indices(1, 1),
            [(0, 1), (1, 0), (2, 1), (1, 2)],
            "Neighbours of (1, 1) not matching."
        );
        assert_eq!(
            test_lattice.get_all_neighbour_indices(1, 2),
            [(0, 2), (1, 1), (2, 2), (1, 0)],
            "Neighbours of (1, 2) not matching."
        );
    }

    #[test]
    fn square_lattice_single_site_is_its_own_neighbour() {
        let test_lattice = SquareLattice::new_with_ones(1);
        let neighbours: Vec<_> = test_lattice.iter_neighbours((0, 0)).collect();
        assert_eq!(neighbours, vec![(0, 0); 4]);
    }

    #[test]
    fn square_lattice_linear_index_is_row_major() {
        let test_lattice = build_square_test_lattice();
        assert_eq!(test_lattice.linear_index((0, 0)), 0);
        assert_eq!(test_lattice.linear_index((0, 2)), 2);
        assert_eq!(test_lattice.linear_index((2, 1)), 7);
        assert_eq!(test_lattice.spins()[7], test_lattice.idx_into((2, 1)));
    }

    #[test]
    fn square_lattice_flip() {
        let benchmark_lattice = build_square_test_lattice();
        let mut test_lattice = SquareLattice::new_with_ones(3);

        test_lattice.flip((0, 1));
        test_lattice.flip((2, 0));
        test_lattice.flip((2, 1));

        assert!(test_lattice.is_state_equal(&benchmark_lattice));

        test_lattice.flip_all();
        test_lattice.flip_all();
        assert!(test_lattice.is_state_equal(&benchmark_lattice));
    }

    #[test]
    fn square_lattice_idx_into() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(test_lattice.idx_into((0, 0)), 1i8);
        assert_eq!(test_lattice.idx_into((1, 1)), 1i8);
        assert_eq!(test_lattice.idx_into((2, 2)), 1i8);
        assert_eq!(test_lattice.idx_into((2, 0)), -1i8);
        assert_eq!(test_lattice.idx_into((2, 1)), -1i8);
    }

    #[test]
    fn square_lattice_get_sum_of_spins() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(test_lattice.get_sum_of_spins(), 3);
        approx::assert_relative_eq!(test_lattice.get_magnetisation(), 1. / 3.);
    }

    #[test]
    fn square_lattice_new_random_is_reproducible_and_valid() {
        let first = SquareLattice::new_random(8, &mut SmallRng::seed_from_u64(15));
        let second = SquareLattice::new_random(8, &mut SmallRng::seed_from_u64(15));

        assert!(first.is_state_equal(&second));
        assert!(first.spins().iter().all(|s| *s == 1 || *s == -1));
        // 64 fair coin flips all landing the same way would be astonishing
        assert!(first.get_sum_of_spins().abs() < 64);
    }

    #[test]
    fn square_lattice_draw_random_index_in_bounds() {
        let test_lattice = SquareLattice::new_with_ones(4);
        let mut test_rng = SmallRng::seed_from_u64(15);

        let drawn: HashSet<(usize, usize)> = (0..1000)
            .map(|_| test_lattice.draw_random_index(&mut test_rng))
            .collect();

        assert!(drawn.iter().all(|(i, j)| *i < 4 && *j < 4));
        assert_eq!(drawn.len(), 16, "Every site should be drawn eventually.");
    }

    #[test]
    fn square_lattice_iter_neighbours() {
        let test_lattice = build_square_test_lattice();

        let expected_nns_of_1_0: HashSet<(usize, usize)> =
            HashSet::from([(0, 0), (1, 2), (2, 0), (1, 1)]);
        let actual_nns_of_1_0: Vec<(usize, usize)> = test_lattice.iter_neighbours((1, 0)).collect();

        assert_eq!(
            expected_nns_of_1_0.len(),
            actual_nns_of_1_0.len(),
            "Not as many neighbours of (1, 0) as expected."
        );
        assert_eq!(
            expected_nns_of_1_0,
            HashSet::from_iter(actual_nns_of_1_0.into_iter()),
            "Neighbours of (1, 0) not as expected."
        );

        let expected_nns_of_2_2: HashSet<(usize, usize)> =
            HashSet::from([(1, 2), (2, 1), (0, 2), (2, 0)]);
        let actual_nns_of_2_2: HashSet<(usize, usize)> =
            test_lattice.iter_neighbours((2, 2)).collect();

        assert_eq!(
            expected_nns_of_2_2, actual_nns_of_2_2,
            "Neighbours of (2, 2) not as expected."
        );
    }
}
