mod dice;
mod stats;
