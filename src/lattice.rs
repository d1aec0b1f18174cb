use rand;
use std::fmt::Debug;

pub const K_BOLTZMANN: f64 = 1.; // using Planck units

pub mod square_lattice;

pub trait Lattice {
    type Idx: Copy + PartialEq + Eq + Debug;

    fn number_sites(&self) -> usize;

    /// Position of `idx` in the flat spin buffer, in `0..number_sites()`.
    fn linear_index(&self, idx: Self::Idx) -> usize;

    fn flip(&mut self, flip_idx: Self::Idx);

    fn idx_into(&self, idx: Self::Idx) -> i8;

    fn draw_random_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self::Idx;

    fn get_sum_of_spins(&self) -> i64;

    fn get_magnetisation(&self) -> f64 {
        (self.get_sum_of_spins() as f64) / (self.number_sites() as f64)
    }

    /// The spins in linear index order.
    fn spins(&self) -> &[i8];

    fn describe(&self) -> String {
        String::from("Unknown lattice")
    }
}

pub trait SupportsWolfAlgorithm: Lattice {
    fn iter_neighbours(&self, index: Self::Idx) -> impl Iterator<Item = <Self as Lattice>::Idx>;

    /// Energy cost of breaking one bond, `2 J`.
    fn get_pots_interaction(&self) -> f64;
}
