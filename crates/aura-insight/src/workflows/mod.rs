pub mod analysis;
pub mod assessment;
pub mod intake;
pub mod leads;
pub mod partners;
