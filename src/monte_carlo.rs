pub mod autocorrelation;
pub mod equilibration;
pub mod mc_results;
pub mod sampler;
pub mod wolff_cluster;
