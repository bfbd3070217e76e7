mod vcf42;

pub use vcf42::*;
