mod algorithm;
mod component;
mod em;
mod hyperparams;
mod init;
mod iter;

pub use algorithm::*;
pub use component::*;
pub use hyperparams::*;
pub use iter::*;
