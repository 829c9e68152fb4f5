pub mod convert;
pub mod data_src;
pub mod datalist;
pub mod env;
pub mod folds;
pub mod plan;
pub mod run;
pub mod train;
