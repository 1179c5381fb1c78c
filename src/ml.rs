pub mod clarity;
pub mod clustering;
pub mod features;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod render;
pub mod spread;
pub mod stats;
